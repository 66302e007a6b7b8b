//! Intake dialogue as an explicit state machine
//!
//! Each stage owns a pure transition `(stage, record, input) -> Transition`.
//! The transition never touches the record; it returns the field updates for
//! the caller to fold in with [`IntakeRecord::apply`]. Free text is normalized
//! with keyword matching, the same way chip labels are phrased.

use super::record::{
    bmi_from, AlcoholFrequency, AutopayChoice, FamilyMember, Identity, IntakeRecord,
    IntakeUpdate, Relation, SmokingFrequency,
};
use crate::profile::{PaymentFrequency, PolicyType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One rupee lakh
const LAKH: u64 = 100_000;

/// Largest coverage accepted from the dialogue, in lakhs (₹100 crore)
const MAX_SUM_ASSURED_LAKHS: u64 = 10_000;

/// Most children a floater can name
const MAX_CHILDREN: u64 = 8;

/// Stages of the dialogue, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStage {
    Kyc,
    Personal,
    Health,
    Family,
    Policy,
    Consents,
    Done,
}

/// An input to the dialogue: either typed text or a verified identity document
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeInput {
    Text(String),
    /// Identity extracted by the external document parser
    VerifiedIdentity(Identity),
}

impl From<&str> for IntakeInput {
    fn from(text: &str) -> Self {
        IntakeInput::Text(text.to_string())
    }
}

/// A question shown to the applicant, with optional quick-reply chips
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    pub text: String,
    pub chips: Vec<String>,
}

impl Prompt {
    fn ask(text: impl Into<String>) -> Self {
        Self { text: text.into(), chips: Vec::new() }
    }

    fn with_chips(text: impl Into<String>, chips: &[&str]) -> Self {
        Self {
            text: text.into(),
            chips: chips.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Result of feeding one input to a stage
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: IntakeStage,
    pub prompts: Vec<Prompt>,
    pub updates: Vec<IntakeUpdate>,
}

impl Transition {
    fn stay(stage: IntakeStage, prompt: Prompt) -> Self {
        Self { next: stage, prompts: vec![prompt], updates: Vec::new() }
    }

    fn to(next: IntakeStage, prompt: Prompt, update: IntakeUpdate) -> Self {
        Self { next, prompts: vec![prompt], updates: vec![update] }
    }
}

/// Opening message of the dialogue
pub fn welcome() -> Prompt {
    Prompt::with_chips(
        "Welcome to your insurance intake! Let's start with identity verification. \
         Would you like to upload your Aadhaar for quick prefill?",
        &["Upload Aadhaar", "Enter manually"],
    )
}

/// Advance the dialogue by one input
pub fn transition(stage: IntakeStage, record: &IntakeRecord, input: &IntakeInput) -> Transition {
    let text = match input {
        IntakeInput::VerifiedIdentity(identity) => {
            return match stage {
                IntakeStage::Kyc => Transition::to(
                    IntakeStage::Personal,
                    mobile_prompt(),
                    IntakeUpdate::VerifiedIdentity(identity.clone()),
                ),
                _ => Transition { next: stage, prompts: Vec::new(), updates: Vec::new() },
            };
        }
        IntakeInput::Text(text) => text.trim(),
    };

    match stage {
        IntakeStage::Kyc => kyc(record, text),
        IntakeStage::Personal => personal(record, text),
        IntakeStage::Health => health(record, text),
        IntakeStage::Family => family(record, text),
        IntakeStage::Policy => policy(record, text),
        IntakeStage::Consents => consents(text),
        IntakeStage::Done => Transition { next: IntakeStage::Done, prompts: Vec::new(), updates: Vec::new() },
    }
}

fn lower(text: &str) -> String {
    text.to_lowercase()
}

/// True if `word` appears as a whole word in `text`
fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|w| w.eq_ignore_ascii_case(word))
}

fn first_number(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn ten_digit_mobile(text: &str) -> Option<String> {
    text.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == 10)
        .map(str::to_string)
}

fn looks_like_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    match text.split_once('@') {
        Some((user, domain)) => {
            !user.is_empty()
                && match domain.rsplit_once('.') {
                    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
                    None => false,
                }
        }
        None => false,
    }
}

/// `name@provider` with the character classes UPI handles allow
fn looks_like_vpa(text: &str) -> bool {
    match text.split_once('@') {
        Some((user, provider)) => {
            !user.is_empty()
                && !provider.is_empty()
                && user.chars().all(|c| c.is_ascii_alphanumeric() || "._-".contains(c))
                && provider.chars().all(|c| c.is_ascii_alphanumeric() || ".-".contains(c))
        }
        None => false,
    }
}

fn mobile_prompt() -> Prompt {
    Prompt::ask("Now let's get your contact details. What's your mobile number (10 digits)?")
}

fn height_prompt() -> Prompt {
    Prompt::ask("Now for some health details. What's your height in centimeters?")
}

fn policy_type_prompt() -> Prompt {
    Prompt::with_chips(
        "Great! Now, what type of policy are you looking for?",
        &["Individual Health", "Family Floater", "Life Insurance"],
    )
}

fn coverage_prompt() -> Prompt {
    Prompt::with_chips(
        "What coverage amount are you looking for?",
        &["₹5 Lakhs", "₹10 Lakhs", "₹20 Lakhs", "₹50 Lakhs", "Custom amount"],
    )
}

fn frequency_prompt() -> Prompt {
    Prompt::with_chips("How would you like to pay your premiums?", &["Monthly", "Yearly (save 8%)"])
}

fn consents_prompt() -> Prompt {
    Prompt::with_chips(
        "Almost done! I need your consent for a few things:",
        &["I agree to all consents", "Show me the details"],
    )
}

fn kyc(record: &IntakeRecord, text: &str) -> Transition {
    let input = lower(text);

    if record.identity.source.is_some() {
        // Manual entry: name, then date of birth
        if record.identity.name.is_none() {
            return Transition::to(
                IntakeStage::Kyc,
                Prompt::ask("Thanks! What's your date of birth (YYYY-MM-DD)?"),
                IntakeUpdate::Name(text.to_string()),
            );
        }
        return match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Ok(dob) => Transition::to(IntakeStage::Personal, mobile_prompt(), IntakeUpdate::DateOfBirth(dob)),
            Err(_) => Transition::stay(
                IntakeStage::Kyc,
                Prompt::ask("Please enter your date of birth as YYYY-MM-DD:"),
            ),
        };
    }

    if input.contains("upload") || input.contains("aadhaar") {
        Transition::stay(
            IntakeStage::Kyc,
            Prompt::ask("Please select your Aadhaar file (PDF, JPG, or PNG):"),
        )
    } else if input.contains("manual") {
        Transition::to(
            IntakeStage::Kyc,
            Prompt::ask("Let's collect your details manually. What's your full name?"),
            IntakeUpdate::ManualIdentity,
        )
    } else {
        Transition::stay(IntakeStage::Kyc, welcome())
    }
}

fn personal(record: &IntakeRecord, text: &str) -> Transition {
    if record.contact.mobile.is_none() {
        return match ten_digit_mobile(text) {
            Some(mobile) => Transition::to(
                IntakeStage::Personal,
                Prompt::ask("Got it! What's your email address?"),
                IntakeUpdate::Mobile(mobile),
            ),
            None => Transition::stay(IntakeStage::Personal, Prompt::ask("What's your mobile number (10 digits)?")),
        };
    }

    if record.contact.email.is_none() {
        return if looks_like_email(text) {
            Transition::to(IntakeStage::Health, height_prompt(), IntakeUpdate::Email(text.to_string()))
        } else {
            Transition::stay(IntakeStage::Personal, Prompt::ask("Please provide a valid email address:"))
        };
    }

    Transition::stay(IntakeStage::Health, height_prompt())
}

fn health(record: &IntakeRecord, text: &str) -> Transition {
    let input = lower(text);
    let health = &record.health;

    let Some(height) = health.height_cm else {
        return match first_number(text) {
            Some(h) if (101..=249).contains(&h) => Transition::to(
                IntakeStage::Health,
                Prompt::ask("Great! What's your weight in kilograms?"),
                IntakeUpdate::HeightCm(h as u32),
            ),
            _ => Transition::stay(
                IntakeStage::Health,
                Prompt::ask("Please enter a valid height in centimeters (e.g., 175):"),
            ),
        };
    };

    if health.weight_kg.is_none() {
        return match first_number(text) {
            Some(w) if (31..=199).contains(&w) => {
                let bmi = bmi_from(height, w as u32);
                Transition::to(
                    IntakeStage::Health,
                    Prompt::with_chips(
                        format!("Perfect! Your BMI is {:.1}. Now, what's your smoking status?", bmi),
                        &["Never smoked", "Occasional smoker", "Daily smoker"],
                    ),
                    IntakeUpdate::WeightKg(w as u32),
                )
            }
            _ => Transition::stay(
                IntakeStage::Health,
                Prompt::ask("Please enter a valid weight in kilograms (e.g., 70):"),
            ),
        };
    }

    if health.smoker.is_none() {
        let freq = if input.contains("daily") {
            SmokingFrequency::Daily
        } else if input.contains("occasional") {
            SmokingFrequency::Occasional
        } else {
            SmokingFrequency::Never
        };
        return Transition::to(
            IntakeStage::Health,
            Prompt::with_chips("How often do you drink alcohol?", &["None", "Occasional", "Regular"]),
            IntakeUpdate::Smoking(freq),
        );
    }

    if health.alcohol.is_none() {
        let freq = if input.contains("regular") {
            AlcoholFrequency::Regular
        } else if input.contains("occasional") {
            AlcoholFrequency::Occasional
        } else {
            AlcoholFrequency::None
        };
        return Transition::to(
            IntakeStage::Health,
            Prompt::with_chips(
                "Do you have any diagnosed medical conditions?",
                &["Diabetes", "Hypertension", "Asthma", "None", "Other"],
            ),
            IntakeUpdate::Alcohol(freq),
        );
    }

    if has_word(&input, "none") || has_word(&input, "no") || input.contains("that's all") {
        return Transition::to(IntakeStage::Family, policy_type_prompt(), IntakeUpdate::ConditionsComplete);
    }

    if input.contains("add another") || has_word(&input, "other") {
        return Transition::stay(IntakeStage::Health, Prompt::ask("Which condition should I add?"));
    }

    let code = ["diabetes", "hypertension", "asthma"]
        .into_iter()
        .find(|known| input.contains(known))
        .map(str::to_string)
        .unwrap_or(input);

    Transition::to(
        IntakeStage::Health,
        Prompt::with_chips(
            "Thank you for sharing that information. Any other conditions?",
            &["No, that's all", "Add another condition"],
        ),
        IntakeUpdate::AddCondition(code),
    )
}

fn family_members_from(input: &str) -> Option<Vec<FamilyMember>> {
    let mentions_spouse = input.contains("spouse");
    let mentions_parents = input.contains("parent");
    let children = if input.contains("child") {
        match first_number(input).unwrap_or(1) {
            n @ 1..=MAX_CHILDREN => n as usize,
            _ => return None,
        }
    } else {
        0
    };

    if !mentions_spouse && !mentions_parents && children == 0 {
        return None;
    }

    let mut members = Vec::new();
    if mentions_spouse {
        members.push(FamilyMember::new(Relation::Spouse));
    }
    members.extend((0..children).map(|_| FamilyMember::new(Relation::Child)));
    if mentions_parents {
        members.push(FamilyMember::new(Relation::Parent));
        members.push(FamilyMember::new(Relation::Parent));
    }
    Some(members)
}

fn family(record: &IntakeRecord, text: &str) -> Transition {
    let input = lower(text);

    if record.policy.policy_type == Some(PolicyType::FamilyFloater) {
        return match family_members_from(&input) {
            Some(members) => Transition::to(IntakeStage::Policy, coverage_prompt(), IntakeUpdate::FamilyMembers(members)),
            None => Transition::stay(IntakeStage::Family, family_size_prompt()),
        };
    }

    if input.contains("individual") || has_word(&input, "health") {
        Transition::to(IntakeStage::Policy, coverage_prompt(), IntakeUpdate::PolicyType(PolicyType::Health))
    } else if input.contains("family") || input.contains("floater") {
        Transition::to(IntakeStage::Family, family_size_prompt(), IntakeUpdate::PolicyType(PolicyType::FamilyFloater))
    } else if input.contains("life") || input.contains("term") {
        Transition::to(IntakeStage::Policy, coverage_prompt(), IntakeUpdate::PolicyType(PolicyType::Life))
    } else {
        Transition::stay(IntakeStage::Family, policy_type_prompt())
    }
}

fn family_size_prompt() -> Prompt {
    Prompt::with_chips(
        "Perfect! How many family members do you want to include?",
        &["Spouse only", "Spouse + 1 child", "Spouse + 2 children", "Spouse + parents"],
    )
}

fn policy(record: &IntakeRecord, text: &str) -> Transition {
    let input = lower(text);
    let choice = &record.policy;

    if choice.sum_assured.is_none() {
        if input.contains("custom") {
            return Transition::to(
                IntakeStage::Policy,
                Prompt::ask("Please enter your desired coverage amount in lakhs (e.g., 15 for ₹15 lakhs):"),
                IntakeUpdate::AwaitCustomAmount,
            );
        }
        let amount = first_number(text)
            .filter(|n| (1..=MAX_SUM_ASSURED_LAKHS).contains(n))
            .and_then(|lakhs| lakhs.checked_mul(LAKH));
        return match amount {
            Some(sum_assured) => {
                let next = if choice.policy_type == Some(PolicyType::Life) {
                    Prompt::with_chips("For how many years do you want cover?", &["10 years", "20 years", "30 years"])
                } else {
                    frequency_prompt()
                };
                Transition::to(IntakeStage::Policy, next, IntakeUpdate::SumAssured(sum_assured))
            }
            None => Transition::stay(IntakeStage::Policy, coverage_prompt()),
        };
    }

    if choice.policy_type == Some(PolicyType::Life) && choice.term_years.is_none() {
        return match first_number(text).filter(|n| (5..=40).contains(n)) {
            Some(term) => Transition::to(IntakeStage::Policy, frequency_prompt(), IntakeUpdate::TermYears(term as u32)),
            None => Transition::stay(
                IntakeStage::Policy,
                Prompt::ask("Please enter a policy term between 5 and 40 years:"),
            ),
        };
    }

    if choice.premium_frequency.is_none() {
        let freq = if input.contains("monthly") {
            PaymentFrequency::Monthly
        } else {
            PaymentFrequency::Yearly
        };
        return Transition::to(
            IntakeStage::Policy,
            Prompt::with_chips(
                "Would you like to set up UPI AutoPay for an additional 5% discount?",
                &["Yes, setup AutoPay", "No, I'll pay manually"],
            ),
            IntakeUpdate::Frequency(freq),
        );
    }

    match choice.autopay {
        None => {
            if has_word(&input, "yes") || input.contains("setup") {
                Transition::to(
                    IntakeStage::Policy,
                    Prompt::ask("Great! Please enter your UPI ID (e.g., yourname@paytm):"),
                    IntakeUpdate::Autopay(AutopayChoice::Requested),
                )
            } else {
                Transition::to(IntakeStage::Consents, consents_prompt(), IntakeUpdate::Autopay(AutopayChoice::Declined))
            }
        }
        Some(AutopayChoice::Requested) => {
            if looks_like_vpa(text) {
                Transition::to(
                    IntakeStage::Consents,
                    consents_prompt(),
                    IntakeUpdate::Autopay(AutopayChoice::Enrolled { vpa: text.to_string() }),
                )
            } else {
                Transition::stay(
                    IntakeStage::Policy,
                    Prompt::ask("Please enter a valid UPI ID (e.g., yourname@paytm):"),
                )
            }
        }
        Some(_) => Transition::stay(IntakeStage::Consents, consents_prompt()),
    }
}

fn consents(text: &str) -> Transition {
    let input = lower(text);

    if input.contains("agree") {
        Transition::to(
            IntakeStage::Done,
            Prompt::ask("Perfect! All set. Here are your personalized recommendations."),
            IntakeUpdate::ConsentsAccepted,
        )
    } else if input.contains("detail") {
        Transition::stay(
            IntakeStage::Consents,
            Prompt::with_chips(
                "We need your consent to: use your details to find plans, verify your \
                 identity offline, process your data, arrange medical tests if required, \
                 and record your declarations.",
                &["I agree to all consents"],
            ),
        )
    } else {
        Transition::stay(IntakeStage::Consents, consents_prompt())
    }
}

/// Stage plus collected answers, for callers that drive the dialogue turn by turn
#[derive(Debug, Clone)]
pub struct IntakeSession {
    stage: IntakeStage,
    record: IntakeRecord,
}

impl IntakeSession {
    pub fn new() -> Self {
        Self { stage: IntakeStage::Kyc, record: IntakeRecord::default() }
    }

    /// Feed one input, apply its updates and return the prompts to show
    pub fn advance(&mut self, input: impl Into<IntakeInput>) -> Vec<Prompt> {
        let outcome = transition(self.stage, &self.record, &input.into());
        for update in outcome.updates {
            self.record.apply(update);
        }
        self.stage = outcome.next;
        outcome.prompts
    }

    pub fn stage(&self) -> IntakeStage {
        self.stage
    }

    pub fn record(&self) -> &IntakeRecord {
        &self.record
    }

    pub fn is_complete(&self) -> bool {
        self.stage == IntakeStage::Done
    }
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}
