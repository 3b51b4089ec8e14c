pub mod account;
pub mod diagnosis;
pub mod enums;
pub mod record;

pub use account::Account;
pub use diagnosis::{Answer, Candidate, DetailBundle};
pub use record::DiagnosisRecord;
