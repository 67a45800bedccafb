//! Integration tests for the CLI commands
//!
//! These tests run the generate, report and show flow against state files
//! in a temporary directory.

#[cfg(test)]
mod cli_tests {
    use bracket_cli::{commands, config::CliConfig};
    use bracket_engine::{BracketFormat, MatchReport};
    use std::fs;
    use tempfile::TempDir;

    const ENTRANTS: &str = r#"[
        {"id": 11, "name": "Ana Souza", "nickname": "ana"},
        {"id": 12, "name": "Bruno Lima", "nickname": "bruno"},
        {"id": 13, "name": "Carla Dias", "nickname": "carla"},
        {"id": 14, "name": "Davi Rocha", "nickname": "davi"}
    ]"#;

    fn seeded() -> CliConfig {
        CliConfig {
            seed: Some(2024),
            ..CliConfig::default()
        }
    }

    #[test]
    fn test_generate_report_show() {
        let dir = TempDir::new().unwrap();
        let entrants_path = dir.path().join("entrants.json");
        let state_path = dir.path().join("bracket.json");
        fs::write(&entrants_path, ENTRANTS).unwrap();

        let entrants = commands::load_entrants(&entrants_path).unwrap();
        assert_eq!(entrants.len(), 4);
        assert_eq!(entrants[0].short_name, "ana");

        let state =
            commands::generate(&seeded(), entrants, BracketFormat::DoubleElimination).unwrap();
        commands::save_state(&state_path, &state).unwrap();

        let stored: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&state_path).unwrap()).unwrap();
        assert_eq!(stored["1"]["bracket"], "WB");
        assert_eq!(stored["6"]["roundName"], "Grande Final");

        // play every ready match, slot 0 wins
        loop {
            let loaded = commands::load_state(&state_path).unwrap();
            let Some(&id) = loaded.ready_matches().first() else {
                break;
            };
            commands::report(&state_path, id, MatchReport::Scores { p1: 2, p2: 0 }).unwrap();
        }

        let finished = commands::load_state(&state_path).unwrap();
        assert!(finished.is_complete());
        let text = commands::render(&finished);
        assert!(text.contains("== Grand Final =="));
        assert!(text.contains("Champion:"));
    }

    #[test]
    fn test_report_errors_leave_file_untouched() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("bracket.json");

        let entrants = (1..=4)
            .map(|id| bracket_engine::Entrant::new(id, format!("Player {id}"), format!("P{id}")))
            .collect();
        let state =
            commands::generate(&seeded(), entrants, BracketFormat::SingleElimination).unwrap();
        commands::save_state(&state_path, &state).unwrap();
        let before = fs::read_to_string(&state_path).unwrap();

        assert!(commands::report(&state_path, 1, MatchReport::Scores { p1: 1, p2: 1 }).is_err());
        assert!(commands::report(&state_path, 3, MatchReport::Winner(0)).is_err());
        assert!(commands::report(&state_path, 42, MatchReport::Winner(0)).is_err());
        assert_eq!(fs::read_to_string(&state_path).unwrap(), before);
    }

    #[test]
    fn test_invalid_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(commands::load_entrants(&path).is_err());
        assert!(commands::load_state(&path).is_err());
        assert!(commands::load_state(&dir.path().join("missing.json")).is_err());
    }
}
