#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::generator::outlet::{DiskOutlet, Outlet, ResearchReport};
    use crate::generator::workflow::{PipelineState, Stage, StageEvent};
    use crate::types::Draft;

    fn completed_state() -> PipelineState {
        let draft = Draft {
            topic: "Solar Panels: How They Work?".to_string(),
            answer: "Draft".to_string(),
            format: "markdown".to_string(),
            sources_count: 2,
            source_urls: vec!["https://a".to_string(), "https://b".to_string()],
            refined: false,
            feedback: None,
        };
        let final_draft = draft.revised("# Final answer".to_string(), "Be concrete.");

        PipelineState {
            raw_query: "How do solar panels work?".to_string(),
            topic: "Solar Panels: How They Work?".to_string(),
            research_result: None,
            draft: Some(draft),
            feedback: Some("Be concrete.".to_string()),
            final_draft: Some(final_draft),
            current_stage: Some(Stage::RefineAnswer),
            complete: true,
        }
    }

    #[test]
    fn test_report_from_completed_state() {
        let report = ResearchReport::from_state(&completed_state()).unwrap();

        assert_eq!(report.query, "How do solar panels work?");
        assert_eq!(report.final_answer, "# Final answer");
        assert_eq!(report.sources_count, 2);
        assert!(report.refined);
        assert_eq!(report.feedback.as_deref(), Some("Be concrete."));
    }

    #[test]
    fn test_report_rejects_incomplete_state() {
        let mut state = completed_state();
        state.complete = false;
        assert!(ResearchReport::from_state(&state).is_err());

        let state = PipelineState::new("question");
        assert!(ResearchReport::from_state(&state).is_err());
    }

    #[tokio::test]
    async fn test_disk_outlet_writes_json_and_markdown() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested").join("output");
        let outlet = DiskOutlet::new(&output_dir);
        let report = ResearchReport::from_state(&completed_state()).unwrap();

        let saved = outlet.save("20250101_120000", &report).await.unwrap();

        assert_eq!(
            saved.json_path,
            output_dir.join("20250101_120000_solar_panels__how_they_work.json")
        );
        assert_eq!(
            saved.markdown_path,
            output_dir.join("20250101_120000_solar_panels__how_they_work.md")
        );

        let markdown = std::fs::read_to_string(&saved.markdown_path).unwrap();
        assert_eq!(markdown, "# Final answer");

        let json = std::fs::read_to_string(&saved.json_path).unwrap();
        let restored: ResearchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, report);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["state"]["current_stage"], "refine_answer");
    }

    #[tokio::test]
    async fn test_snapshot_uses_stage_name() {
        let temp_dir = TempDir::new().unwrap();
        let outlet = DiskOutlet::new(temp_dir.path());
        let mut state = PipelineState::new("What is tidal energy?");
        state.topic = "tidal energy".to_string();
        state.current_stage = Some(Stage::ParseQuery);
        let event = StageEvent {
            stage: Stage::ParseQuery,
            elapsed: Duration::from_millis(5),
            state,
        };

        let path = outlet.save_snapshot("stamp", &event).await.unwrap();

        assert_eq!(
            path,
            temp_dir.path().join("stamp_tidal_energy.parse_query.json")
        );
        let restored: PipelineState =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored, event.state);
    }
}
