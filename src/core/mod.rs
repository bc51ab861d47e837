pub mod dates;
pub mod engine;
pub mod mapper;
pub mod matcher;
pub mod realign;
pub mod team;
pub mod tokenizer;
pub mod validator;

pub use crate::domain::model::{ImportResult, ParsedCaseRecord, TeamMemberInfo};
pub use crate::domain::ports::{CaseStore, ClientStore, StaffDirectory};
pub use crate::utils::error::Result;
pub use engine::{parse_case_file, ImportEngine, ImportRun, ParseReport};
pub use mapper::{FieldKind, SynonymSet};
