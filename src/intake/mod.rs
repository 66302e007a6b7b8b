//! Conversational intake: collects answers that are later mapped to an applicant profile

mod record;
mod machine;

pub use record::{
    bmi_from, AlcoholFrequency, AutopayChoice, Consents, Contact, DiagnosedCondition, FamilyMember,
    Gender, HealthInfo, Identity, IdentitySource, IntakeRecord, IntakeUpdate, PolicyChoice, Relation,
    SmokingFrequency,
};
pub use machine::{transition, welcome, IntakeInput, IntakeSession, IntakeStage, Prompt, Transition};
