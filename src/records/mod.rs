pub mod assemble;
pub mod forms;
pub mod types;
pub mod validation;

pub use assemble::{delete_record, submit, test_number};
pub use forms::SubmissionForm;
pub use types::{
    DescriptionOption, IstInput, IstScores, PapikostickInput, PapikostickScores, PersonalInfo,
    PersonalRecord, TestReport,
};
pub use validation::{validate_submission, ValidSubmission};
