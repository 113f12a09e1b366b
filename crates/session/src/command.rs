//! JSON command protocol: one JSON object per user action.
//!
//! Drives a session headlessly (script mode of the binary, integration tests).

use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::{CurveType, FillAlgorithm, HullAlgorithm, Point2D, TransformCommand};

use crate::build::CurveParams;
use crate::channel::{ConnectionState, SessionChannel};
use crate::render::RenderSink;
use crate::session::Session;
use crate::state::input::{ClickOutcome, DrawingMode, LinePhase};
use crate::validation::ObjectValidator;

/// A user action
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Switch the drawing mode
    SelectMode { mode: DrawingMode },
    SelectCurveType { curve_type: CurveType },
    SetLineAlgorithm { algorithm: String },
    SetCurveParams {
        #[serde(default)]
        param1: Option<f64>,
        #[serde(default)]
        param2: Option<f64>,
    },
    SetFillAlgorithm { algorithm: FillAlgorithm },
    /// Canvas click in the active mode
    Click { x: f64, y: f64 },
    DrawCurve,
    CheckConvex,
    ConvexHull { algorithm: HullAlgorithm },
    CheckPointInside,
    CheckSegmentIntersects,
    FillPolygon,
    GenerateVoronoi,
    /// Import mesh text given inline
    ImportObject { text: String },
    /// Import mesh text from a file
    LoadObject { path: String },
    Transform { transform: TransformCommand },
    /// Keyboard transform (`ArrowUp`, `KeyW`, `+`, ...)
    Key { key: String },
    /// Apply broadcasts received so far
    Pump,
    /// Clear all accumulated points and the canvas
    Clear,
    ClearCanvas,
    /// Dump the session state
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }

    fn from_result<T>(
        result: Result<T, impl std::fmt::Display>,
        data: impl FnOnce(T) -> serde_json::Value,
    ) -> Self {
        match result {
            Ok(value) => Self::ok_with_data(data(value)),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

/// Execute a single command on a session.
pub fn execute_command<C: SessionChannel, R: RenderSink>(
    session: &mut Session<C, R>,
    cmd: SessionCommand,
) -> CommandResponse {
    match cmd {
        SessionCommand::SelectMode { mode } => {
            session.select_mode(mode);
            CommandResponse::ok_with_data(json!({ "instruction": session.instruction() }))
        }

        SessionCommand::SelectCurveType { curve_type } => {
            session.select_curve_type(curve_type);
            CommandResponse::ok()
        }

        SessionCommand::SetLineAlgorithm { algorithm } => {
            session.set_line_algorithm(algorithm);
            CommandResponse::ok()
        }

        SessionCommand::SetCurveParams { param1, param2 } => {
            session.set_curve_params(CurveParams { param1, param2 });
            CommandResponse::ok()
        }

        SessionCommand::SetFillAlgorithm { algorithm } => {
            session.set_fill_algorithm(algorithm);
            CommandResponse::ok()
        }

        SessionCommand::Click { x, y } => {
            let result = session.click(Point2D::new(x, y));
            let instruction = session.instruction();
            CommandResponse::from_result(result, |outcome| {
                json!({
                    "outcome": outcome_name(&outcome),
                    "instruction": instruction,
                })
            })
        }

        SessionCommand::DrawCurve => {
            CommandResponse::from_result(session.draw_curve(), |_| json!({}))
        }

        SessionCommand::CheckConvex => {
            CommandResponse::from_result(session.check_convex(), |convex| {
                json!({ "result": convex })
            })
        }

        SessionCommand::ConvexHull { algorithm } => {
            CommandResponse::from_result(session.convex_hull(algorithm), |hull| {
                json!({ "hull": hull })
            })
        }

        SessionCommand::CheckPointInside => CommandResponse::from_result(
            session.check_point_inside(),
            |inside| json!({ "result": inside }),
        ),

        SessionCommand::CheckSegmentIntersects => CommandResponse::from_result(
            session.check_segment_intersects(),
            |hit| json!({ "result": hit }),
        ),

        SessionCommand::FillPolygon => {
            CommandResponse::from_result(session.fill_polygon(), |_| json!({}))
        }

        SessionCommand::GenerateVoronoi => {
            CommandResponse::from_result(session.generate_voronoi(), |_| json!({}))
        }

        SessionCommand::ImportObject { text } => CommandResponse::from_result(
            session.import_object(&text),
            |vertices| json!({ "vertices": vertices }),
        ),

        SessionCommand::LoadObject { path } => match std::fs::read_to_string(&path) {
            Ok(text) => CommandResponse::from_result(
                session.import_object(&text),
                |vertices| json!({ "vertices": vertices }),
            ),
            Err(e) => CommandResponse::err(format!("Failed to read {path}: {e}")),
        },

        SessionCommand::Transform { transform } => {
            CommandResponse::from_result(session.transform(transform), |_| json!({}))
        }

        SessionCommand::Key { key } => {
            CommandResponse::from_result(session.transform_key(&key), |handled| {
                json!({ "handled": handled })
            })
        }

        SessionCommand::Pump => {
            let applied = session.pump();
            CommandResponse::ok_with_data(json!({ "applied": applied }))
        }

        SessionCommand::Clear => {
            session.clear();
            CommandResponse::ok()
        }

        SessionCommand::ClearCanvas => {
            session.clear_canvas();
            CommandResponse::ok()
        }

        SessionCommand::Inspect => CommandResponse::ok_with_data(inspect(session)),
    }
}

fn outcome_name(outcome: &ClickOutcome) -> &'static str {
    match outcome {
        ClickOutcome::LineStarted(_) => "line_started",
        ClickOutcome::LineCompleted { .. } => "line_completed",
        ClickOutcome::CenterCaptured(_) => "center_captured",
        ClickOutcome::PointAdded { .. } => "point_added",
        ClickOutcome::Ignored => "ignored",
    }
}

/// Snapshot of the session state
pub fn inspect<C: SessionChannel, R: RenderSink>(session: &Session<C, R>) -> serde_json::Value {
    let input = session.input();
    let pending_start = match input.line_phase() {
        LinePhase::AwaitingStart => None,
        LinePhase::AwaitingEnd { start } => Some(start),
    };
    let object = session.pipeline().object().map(|o| {
        let v = ObjectValidator::new(o.as_ref());
        json!({
            "vertices": v.vertex_count(),
            "edges": v.edge_count(),
            "degenerate_edges": v.degenerate_edge_count(),
            "unused_vertices": v.unused_vertex_count(),
        })
    });
    let connection = match session.channel().state() {
        ConnectionState::Connecting => "connecting".to_string(),
        ConnectionState::Connected => "connected".to_string(),
        ConnectionState::Failed(reason) => format!("failed: {reason}"),
    };
    json!({
        "session_id": session.id().to_string(),
        "mode": input.mode(),
        "pending_line_start": pending_start,
        "segments": input.segments(),
        "curve_type": input.curve_type(),
        "center": input.center(),
        "curve_points": input.curve_points(),
        "polygon": input.polygon(),
        "voronoi_sites": input.voronoi_sites(),
        "object": object,
        "matrix": session.pipeline().matrix().current(),
        "awaiting_results": session.pipeline().matrix().awaiting(),
        "notices": session.notices(),
        "ignored_payloads": session.ignored_payloads(),
        "connection": connection,
    })
}

/// Parse and execute a single JSON command string.
pub fn execute_json<C: SessionChannel, R: RenderSink>(
    session: &mut Session<C, R>,
    json: &str,
) -> Result<CommandResponse, String> {
    let cmd: SessionCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(session, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch<C: SessionChannel, R: RenderSink>(
    session: &mut Session<C, R>,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<SessionCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(session, cmd))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::TestHarness;

    #[test]
    fn test_command_serde_click() {
        let json = r#"{"command": "click", "x": 10, "y": 20.5}"#;
        let cmd: SessionCommand = serde_json::from_str(json).unwrap();
        match cmd {
            SessionCommand::Click { x, y } => assert_eq!((x, y), (10.0, 20.5)),
            _ => panic!("Expected Click"),
        }
    }

    #[test]
    fn test_command_serde_select_mode() {
        let json = r#"{"command": "select_mode", "mode": "three_d"}"#;
        let cmd: SessionCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, SessionCommand::SelectMode { mode: DrawingMode::ThreeD }));
    }

    #[test]
    fn test_command_serde_transform() {
        let json = r#"{"command": "transform", "transform": {"transformationType": "rotationX", "angle": 5}}"#;
        let cmd: SessionCommand = serde_json::from_str(json).unwrap();
        match cmd {
            SessionCommand::Transform { transform } => {
                assert_eq!(transform, TransformCommand::RotationX { angle: 5.0 })
            }
            _ => panic!("Expected Transform"),
        }
    }

    #[test]
    fn test_command_serde_curve_params_optional() {
        let json = r#"{"command": "set_curve_params", "param1": 40}"#;
        let cmd: SessionCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(
            cmd,
            SessionCommand::SetCurveParams { param1: Some(_), param2: None }
        ));
    }

    #[test]
    fn test_execute_click_outcomes() {
        let mut h = TestHarness::new();
        let resp = execute_json(&mut h.session, r#"{"command": "click", "x": 1, "y": 1}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.data.unwrap()["outcome"], "line_started");

        let resp = execute_json(&mut h.session, r#"{"command": "click", "x": 5, "y": 5}"#).unwrap();
        assert_eq!(resp.data.unwrap()["outcome"], "line_completed");
        assert_eq!(h.draw_commands().len(), 1);
    }

    #[test]
    fn test_execute_validation_error() {
        let mut h = TestHarness::new();
        let resp = execute_json(&mut h.session, r#"{"command": "check_convex"}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("insufficient points"));
    }

    #[test]
    fn test_execute_inspect() {
        let mut h = TestHarness::new();
        h.polygon(&[(0.0, 0.0), (1.0, 0.0)]);
        let resp = execute_json(&mut h.session, r#"{"command": "inspect"}"#).unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data["mode"], "polygon");
        assert_eq!(data["polygon"].as_array().unwrap().len(), 2);
        assert_eq!(data["connection"], "connected");
        assert!(data["object"].is_null());
    }

    #[test]
    fn test_execute_batch() {
        let mut h = TestHarness::new();
        let batch = r#"[
            {"command": "select_mode", "mode": "voronoi"},
            {"command": "click", "x": 1, "y": 1},
            {"command": "click", "x": 9, "y": 4},
            {"command": "generate_voronoi"}
        ]"#;
        let responses = execute_json_batch(&mut h.session, batch).unwrap();
        assert_eq!(responses.len(), 4);
        assert!(responses.iter().all(|r| r.success));
        assert_eq!(h.published_count(), 1);
    }

    #[test]
    fn test_execute_load_missing_file() {
        let mut h = TestHarness::new();
        let resp = execute_json(
            &mut h.session,
            r#"{"command": "load_object", "path": "/nonexistent/cube.obj"}"#,
        )
        .unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("Failed to read"));
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = TestHarness::new();
        assert!(execute_json(&mut h.session, "not valid json").is_err());
        assert!(execute_json(&mut h.session, r#"{"command": "no_such"}"#).is_err());
    }
}
