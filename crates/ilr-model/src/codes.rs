//! Closed code tables shared by every rule.
//!
//! ILR submissions carry most codes as bare integers or short strings. Rules
//! refer to them through the constants and enums below so the same literal is
//! never typed twice.
//!
//! # ILR Reference
//!
//! - Fund models, programme types and aim types: ILR 2019/20 data dictionary, Learning Delivery entity
//! - FAM / AppFin / ESM types: ILR 2019/20 data dictionary, Appendix C and D

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `FundModel` values.
pub mod fund_model {
    pub const COMMUNITY_LEARNING: i32 = 10;
    pub const AGE_16_TO_19: i32 = 25;
    pub const ADULT_SKILLS: i32 = 35;
    pub const APPRENTICESHIPS: i32 = 36;
    pub const EUROPEAN_SOCIAL_FUND: i32 = 70;
    pub const OTHER_ADULT: i32 = 81;
    pub const OTHER_16_TO_19: i32 = 82;
    pub const NOT_FUNDED: i32 = 99;
}

/// `ProgType` values.
pub mod prog_type {
    pub const ADVANCED_LEVEL_APPRENTICESHIP: i32 = 2;
    pub const INTERMEDIATE_LEVEL_APPRENTICESHIP: i32 = 3;
    pub const HIGHER_APPRENTICESHIP_LEVEL4: i32 = 20;
    pub const HIGHER_APPRENTICESHIP_LEVEL5: i32 = 21;
    pub const HIGHER_APPRENTICESHIP_LEVEL6: i32 = 22;
    pub const HIGHER_APPRENTICESHIP_LEVEL7_PLUS: i32 = 23;
    pub const TRAINEESHIP: i32 = 24;
    pub const APPRENTICESHIP_STANDARD: i32 = 25;

    /// Programme types that make a delivery part of an apprenticeship.
    pub const APPRENTICESHIPS: &[i32] = &[
        ADVANCED_LEVEL_APPRENTICESHIP,
        INTERMEDIATE_LEVEL_APPRENTICESHIP,
        HIGHER_APPRENTICESHIP_LEVEL4,
        HIGHER_APPRENTICESHIP_LEVEL5,
        HIGHER_APPRENTICESHIP_LEVEL6,
        HIGHER_APPRENTICESHIP_LEVEL7_PLUS,
        APPRENTICESHIP_STANDARD,
    ];
}

/// `AimType` values.
pub mod aim_type {
    pub const PROGRAMME_AIM: i32 = 1;
    pub const COMPONENT_AIM_IN_A_PROGRAMME: i32 = 3;
    pub const CORE_AIM_16_TO_19: i32 = 5;
}

/// `EmpStat` values.
pub mod emp_stat {
    pub const IN_PAID_EMPLOYMENT: i32 = 10;
    pub const NOT_EMPLOYED_SEEKING_AND_AVAILABLE: i32 = 11;
    pub const NOT_EMPLOYED_NOT_SEEKING_OR_NOT_AVAILABLE: i32 = 12;
    pub const NOT_KNOWN_PROVIDED: i32 = 98;

    pub const NOT_EMPLOYED: &[i32] = &[
        NOT_EMPLOYED_SEEKING_AND_AVAILABLE,
        NOT_EMPLOYED_NOT_SEEKING_OR_NOT_AVAILABLE,
    ];
}

/// `ESMCode` values for the `BSI` (benefit status indicator) monitoring type.
pub mod benefit_status {
    pub const JOB_SEEKERS_ALLOWANCE: i32 = 1;
    pub const EMPLOYMENT_AND_SUPPORT_ALLOWANCE_WRAG: i32 = 2;
    pub const OTHER_STATE_BENEFIT: i32 = 3;
    pub const UNIVERSAL_CREDIT: i32 = 4;
}

/// Learning delivery FAM codes that rules compare against.
pub mod learn_del_fam_code {
    pub const FFI_FULLY_FUNDED: &str = "1";
    pub const FFI_CO_FUNDED: &str = "2";
    pub const LDM_MANDATION_TO_SKILLS_TRAINING: &str = "318";
    pub const ACT_EMPLOYER_CONTRACT: &str = "1";
    pub const RES_RESTART: &str = "1";
}

/// AppFin codes for `TNP` (total negotiated price) records.
pub mod tnp_code {
    pub const TRAINING_PRICE: i32 = 1;
    pub const ASSESSMENT_PRICE: i32 = 2;
    pub const RESIDUAL_TRAINING_PRICE: i32 = 3;
    pub const RESIDUAL_ASSESSMENT_PRICE: i32 = 4;
}

/// Funding stream period codes for adult skills contracts.
pub mod funding_stream {
    pub const ADULT_SKILLS_PROCURED: &str = "AEB-AS";
    pub const ADULT_SKILLS_CONTRACT: &str = "AEBC-ASCL";
    pub const ADULT_SKILLS_TRAINEESHIPS: &str = "AEB-TOL";

    pub const ADULT_SKILLS: &[&str] = &[
        ADULT_SKILLS_PROCURED,
        ADULT_SKILLS_CONTRACT,
        ADULT_SKILLS_TRAINEESHIPS,
    ];
}

/// Parse error for the code enums in this module.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code: {value}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant,)+
        }

        impl $name {
            /// Returns the code as it appears in the ILR.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            /// Every known code, in declaration order.
            pub const fn all() -> &'static [Self] {
                &[$($name::$variant,)+]
            }

            /// Case-insensitive comparison against a raw code from a record.
            pub fn matches(&self, raw: &str) -> bool {
                raw.trim().eq_ignore_ascii_case(self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownCode;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::all()
                    .iter()
                    .copied()
                    .find(|code| code.matches(s))
                    .ok_or_else(|| UnknownCode {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

code_enum! {
    /// `LearnDelFAMType`: funding and monitoring types on a learning delivery.
    LearnDelFamType, "LearnDelFAMType" {
        /// Source of funding
        Sof => "SOF",
        /// Full or co-funding indicator
        Ffi => "FFI",
        /// Eligibility for enhanced apprenticeship funding
        Eef => "EEF",
        /// Restart indicator
        Res => "RES",
        /// Learning delivery monitoring
        Ldm => "LDM",
        /// Apprenticeship contract type
        Act => "ACT",
        /// Advanced learner loan indicator
        Adl => "ADL",
        /// Household situation
        Hhs => "HHS",
        /// Learning support funding
        Lsf => "LSF",
        /// Community learning provision type
        Asl => "ASL",
    }
}

code_enum! {
    /// `AFinType`: apprenticeship financial record types.
    AppFinType, "AFinType" {
        /// Total negotiated price
        Tnp => "TNP",
        /// Payment record
        Pmr => "PMR",
    }
}

code_enum! {
    /// `ESMType`: employment status monitoring types.
    EsmType, "ESMType" {
        /// Benefit status indicator
        Bsi => "BSI",
        /// Employment intensity indicator
        Eii => "EII",
        /// Length of unemployment
        Lou => "LOU",
        /// Length of employment
        Loe => "LOE",
        /// Self employment indicator
        Sei => "SEI",
        /// Small employer
        Sem => "SEM",
    }
}

code_enum! {
    /// `LearnFAMType`: funding and monitoring types on the learner.
    LearnerFamType, "LearnFAMType" {
        /// Household situation
        Hhs => "HHS",
        /// Eligibility for 16-19 disadvantage funding
        Edf => "EDF",
        /// Learner support reason
        Lsr => "LSR",
        /// Free meals eligibility
        Fme => "FME",
    }
}
