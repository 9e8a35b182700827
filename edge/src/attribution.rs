// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright © 2026 The git-mind Contributors

use thiserror::Error;

/// Maximum byte length of the `author`/`session_id` strings (spec §3).
pub const ATTRIBUTION_STRING_MAX: usize = 255;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("attribution string exceeds {ATTRIBUTION_STRING_MAX} bytes")]
    StringTooLong,
}

/// Who (or what) produced an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceType {
    Human,
    AiClaude,
    AiGpt,
    AiOther,
    System,
}

impl SourceType {
    pub fn to_u16(self) -> u16 {
        match self {
            SourceType::Human => 0,
            SourceType::AiClaude => 1,
            SourceType::AiGpt => 2,
            SourceType::AiOther => 3,
            SourceType::System => 4,
        }
    }

    /// Unknown values fall back to `Human`, matching the original's
    /// `gm_attribution_from_env` default-on-unrecognised-value behaviour.
    pub fn from_u16(v: u16) -> Self {
        match v {
            0 => SourceType::Human,
            1 => SourceType::AiClaude,
            2 => SourceType::AiGpt,
            3 => SourceType::AiOther,
            4 => SourceType::System,
            _ => SourceType::Human,
        }
    }

    /// The default author string for this source, used when no explicit
    /// author was supplied (`GIT_MIND_AUTHOR` unset).
    pub fn default_author(self) -> &'static str {
        match self {
            SourceType::Human => "user@local",
            SourceType::AiClaude => "claude@anthropic",
            SourceType::AiGpt => "gpt@openai",
            SourceType::AiOther => "unknown@unknown",
            SourceType::System => "system@git-mind",
        }
    }
}

bitflags::bitflags! {
    /// Reserved attribution bits. `REJECTED` excludes a record from default
    /// views without deleting it; `PENDING` marks unreviewed AI output.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Flags: u32 {
        const REJECTED = 1 << 0;
        const PENDING  = 1 << 1;
    }
}

/// Attribution metadata carried by every attributed edge.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Attribution {
    pub source_type: SourceType,
    author: String,
    session_id: String,
    pub flags: Flags,
}

impl Attribution {
    pub fn new(
        source_type: SourceType,
        author: impl Into<String>,
        session_id: impl Into<String>,
        flags: Flags,
    ) -> Result<Self, Error> {
        let author = author.into();
        let session_id = session_id.into();
        if author.len() > ATTRIBUTION_STRING_MAX || session_id.len() > ATTRIBUTION_STRING_MAX {
            return Err(Error::StringTooLong);
        }
        Ok(Self {
            source_type,
            author,
            session_id,
            flags,
        })
    }

    /// The default attribution for a legacy (basic) edge: HUMAN source,
    /// empty author/session, no flags — per spec §3 "Legacy (basic) edge".
    pub fn default_for_legacy() -> Self {
        Self {
            source_type: SourceType::Human,
            author: String::new(),
            session_id: String::new(),
            flags: Flags::empty(),
        }
    }

    /// The default attribution for a given source, with no explicit author
    /// or session — used when `GIT_MIND_AUTHOR`/`GIT_MIND_SESSION` are unset.
    pub fn default_for(source_type: SourceType) -> Self {
        Self {
            source_type,
            author: source_type.default_author().to_string(),
            session_id: String::new(),
            flags: Flags::empty(),
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_rejected(&self) -> bool {
        self.flags.contains(Flags::REJECTED)
    }

    pub fn is_pending(&self) -> bool {
        self.flags.contains(Flags::PENDING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlong_author() {
        let author = "a".repeat(ATTRIBUTION_STRING_MAX + 1);
        assert_eq!(
            Attribution::new(SourceType::Human, author, "", Flags::empty()),
            Err(Error::StringTooLong)
        );
    }

    #[test]
    fn legacy_default_is_human_empty_unflagged() {
        let a = Attribution::default_for_legacy();
        assert_eq!(a.source_type, SourceType::Human);
        assert_eq!(a.author(), "");
        assert_eq!(a.session_id(), "");
        assert_eq!(a.flags, Flags::empty());
    }

    #[test]
    fn flags_roundtrip_bits() {
        let flags = Flags::REJECTED | Flags::PENDING;
        assert!(flags.contains(Flags::REJECTED));
        assert!(flags.contains(Flags::PENDING));
        assert_eq!(flags.bits(), 0b11);
    }

    #[test]
    fn source_type_roundtrips() {
        for st in [
            SourceType::Human,
            SourceType::AiClaude,
            SourceType::AiGpt,
            SourceType::AiOther,
            SourceType::System,
        ] {
            assert_eq!(SourceType::from_u16(st.to_u16()), st);
        }
    }
}
