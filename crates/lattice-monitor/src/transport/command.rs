//! Parsing for the monitor's single-line command protocol.

/// Commands recognised on the monitor socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MonitorCommand {
    /// Full consistency dump of the job subtree.
    Dump,
}

impl MonitorCommand {
    /// Parses one command line, case-insensitively.
    ///
    /// Line terminators are stripped before matching; any other content,
    /// including leading or trailing whitespace, makes the line unrecognised.
    pub(crate) fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        line.eq_ignore_ascii_case("dump").then_some(Self::Dump)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::MonitorCommand;

    #[rstest]
    #[case::lower("dump")]
    #[case::upper("DUMP")]
    #[case::mixed("Dump")]
    #[case::carriage_return("dump\r")]
    fn recognises_the_dump_literal(#[case] line: &str) {
        assert_eq!(MonitorCommand::parse(line), Some(MonitorCommand::Dump));
    }

    #[rstest]
    #[case::trailing_space("dump ")]
    #[case::leading_space(" dump")]
    #[case::other("status")]
    #[case::prefixed("dump all")]
    #[case::empty("")]
    fn rejects_everything_else(#[case] line: &str) {
        assert_eq!(MonitorCommand::parse(line), None);
    }
}
