pub mod health;
pub mod know;
pub mod orcid;
pub mod scholars;
