use anyhow::{bail, Result};

/// Pipeline phases, in fixed execution order. Later phases read tables
/// populated by earlier ones, so the order never varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Drop,
    Create,
    Copy,
    Insert,
}

pub const ALL_PHASES: [Phase; 4] = [Phase::Drop, Phase::Create, Phase::Copy, Phase::Insert];

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::Drop => "drop",
            Phase::Create => "create",
            Phase::Copy => "copy",
            Phase::Insert => "insert",
        }
    }

    fn from_name(name: &str) -> Option<Phase> {
        ALL_PHASES
            .iter()
            .find(|p| p.name() == name.to_lowercase())
            .copied()
    }
}

/// Resolves which phases to execute based on --only/--skip selections.
/// The result always follows pipeline order regardless of flag order.
pub fn resolve_phases(
    only: Option<Vec<String>>,
    skip: Option<Vec<String>>,
) -> Result<Vec<Phase>> {
    match (only, skip) {
        (Some(_), Some(_)) => {
            bail!("Cannot use both --only and --skip at the same time");
        }
        (Some(names), None) => {
            let wanted = parse_names(&names)?;
            Ok(ALL_PHASES
                .iter()
                .copied()
                .filter(|p| wanted.contains(p))
                .collect())
        }
        (None, Some(names)) => {
            let unwanted = parse_names(&names)?;
            Ok(ALL_PHASES
                .iter()
                .copied()
                .filter(|p| !unwanted.contains(p))
                .collect())
        }
        (None, None) => Ok(ALL_PHASES.to_vec()),
    }
}

fn parse_names(names: &[String]) -> Result<Vec<Phase>> {
    names
        .iter()
        .map(|name| match Phase::from_name(name) {
            Some(phase) => Ok(phase),
            None => bail!(
                "Unknown phase: {}. Valid phases: drop, create, copy, insert",
                name
            ),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_default_is_full_pipeline() {
        let phases = resolve_phases(None, None).unwrap();
        assert_eq!(
            phases,
            vec![Phase::Drop, Phase::Create, Phase::Copy, Phase::Insert]
        );
    }

    #[test]
    fn test_only_keeps_pipeline_order() {
        let phases = resolve_phases(Some(strings(&["insert", "copy"])), None).unwrap();
        assert_eq!(phases, vec![Phase::Copy, Phase::Insert]);
    }

    #[test]
    fn test_skip() {
        let phases = resolve_phases(None, Some(strings(&["drop"]))).unwrap();
        assert_eq!(phases, vec![Phase::Create, Phase::Copy, Phase::Insert]);
    }

    #[test]
    fn test_only_and_skip_conflict() {
        let result = resolve_phases(Some(strings(&["drop"])), Some(strings(&["copy"])));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_phase_error() {
        let err = resolve_phases(Some(strings(&["vacuum"])), None)
            .unwrap_err()
            .to_string();
        assert!(err.contains("vacuum"));
    }
}
