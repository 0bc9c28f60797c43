/// Control tokens sent by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// `scan mode`
    BeginScan,
    /// `end scan`
    EndScan,
    /// `Object detected!`, repeated every control cycle while something sits in the chute.
    ObjectPresent,
}

impl Inbound {
    /// Match an already-trimmed line. Unknown lines are not tokens.
    pub fn parse(line: &str) -> Option<Self> {
        match line {
            "scan mode" => Some(Inbound::BeginScan),
            "end scan" => Some(Inbound::EndScan),
            "Object detected!" => Some(Inbound::ObjectPresent),
            _ => None,
        }
    }
}

/// Messages sent back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    BottleDetected,
    NoBottleDetected,
    VoucherCode(String),
}

impl Outbound {
    /// Line text without the terminating newline.
    pub fn as_line(&self) -> &str {
        match self {
            Outbound::BottleDetected => "bottle detected",
            Outbound::NoBottleDetected => "no bottle detected",
            Outbound::VoucherCode(code) => code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_vocabulary() {
        assert_eq!(Inbound::parse("scan mode"), Some(Inbound::BeginScan));
        assert_eq!(Inbound::parse("end scan"), Some(Inbound::EndScan));
        assert_eq!(Inbound::parse("Object detected!"), Some(Inbound::ObjectPresent));
    }

    #[test]
    fn test_parse_is_case_and_punctuation_sensitive() {
        assert_eq!(Inbound::parse("Scan Mode"), None);
        assert_eq!(Inbound::parse("object detected!"), None);
        assert_eq!(Inbound::parse("Object detected"), None);
        assert_eq!(Inbound::parse(""), None);
    }

    #[test]
    fn test_outbound_lines() {
        assert_eq!(Outbound::BottleDetected.as_line(), "bottle detected");
        assert_eq!(Outbound::NoBottleDetected.as_line(), "no bottle detected");
        assert_eq!(Outbound::VoucherCode("ABC123".into()).as_line(), "ABC123");
    }
}
