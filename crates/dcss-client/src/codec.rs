//! Diagnostic payload decoders for the control-bus text protocol.
//!
//! The bus reports robot and sample-handling state through a handful of
//! fixed-grammar text payloads. Everything in this module is pure parsing
//! -- no I/O is performed, and every decoder either returns a fully
//! populated record or fails with a parse error; there are no partially
//! filled results.
//!
//! # Grammars
//!
//! ```text
//! <dir>_start_operation <name> <handle> [<args...>]
//! <dir>_operation_update <name> <handle> [<args...>]
//! <dir>_operation_completed <name> <handle> <status> [<args...>]
//! ... robot_config <handle> found <type phrase> <l|m|r> dz: <float>
//! ... robot_force_<position> <status> <height> <forces...>
//! ... robot_cassette <status> <291 single tokens>
//! ... robot_config <handle> probe <291 integers>
//! ```

use dcss_core::{Direction, Error, Result};

/// Holder slots per cassette message.
const HOLDERS_PER_CASSETTE: usize = 3;
/// Port states per holder.
const PORTS_PER_HOLDER: usize = 96;
/// Tokens carried by one full cassette or probe payload:
/// 3 holders x (1 type token + 96 port tokens).
const CASSETTE_TOKENS: usize = HOLDERS_PER_CASSETTE * (PORTS_PER_HOLDER + 1);

fn parse_f64(token: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| Error::Parse(format!("invalid float: {token}")))
}

fn parse_i64(token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .map_err(|_| Error::Parse(format!("invalid integer: {token}")))
}

// ---------------------------------------------------------------------------
// Operation frames
// ---------------------------------------------------------------------------

/// A decoded `..._start_operation` or `..._operation_update` message.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationMessage {
    pub direction: Direction,
    pub name: String,
    pub handle: String,
    /// Argument text verbatim, `None` when the message carries none.
    pub arguments: Option<String>,
}

/// A decoded `..._operation_completed` message.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationCompleted {
    pub direction: Direction,
    pub name: String,
    pub handle: String,
    pub status: String,
    pub arguments: Option<String>,
}

/// Split `<direction><marker> <name> <handle> [<args>]`, keeping the
/// argument text verbatim.
fn split_operation(message: &str, marker: &str) -> Result<(Direction, String, String, Option<String>)> {
    let at = message
        .find(marker)
        .ok_or_else(|| Error::Parse(format!("not a {marker} message: {message}")))?;
    let direction: Direction = message[..at].parse()?;

    let rest = message[at + marker.len()..]
        .strip_prefix(' ')
        .ok_or_else(|| Error::Parse(format!("malformed {marker} message: {message}")))?;

    let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let name = &rest[..name_end];
    if name.is_empty() {
        return Err(Error::Parse(format!("missing operation name: {message}")));
    }

    let rest = rest[name_end..].trim_start();
    let handle_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let handle = &rest[..handle_end];
    if handle.is_empty() {
        return Err(Error::Parse(format!("missing operation handle: {message}")));
    }

    let tail = &rest[handle_end..];
    let arguments = if tail.is_empty() {
        None
    } else {
        Some(tail.trim_start().to_string())
    };

    Ok((direction, name.to_string(), handle.to_string(), arguments))
}

/// Decode a `..._start_operation` message.
pub fn decode_start_operation(message: &str) -> Result<OperationMessage> {
    let (direction, name, handle, arguments) = split_operation(message, "_start_operation")?;
    Ok(OperationMessage {
        direction,
        name,
        handle,
        arguments,
    })
}

/// Decode a `..._operation_update` message.
pub fn decode_operation_update(message: &str) -> Result<OperationMessage> {
    let (direction, name, handle, arguments) = split_operation(message, "_operation_update")?;
    Ok(OperationMessage {
        direction,
        name,
        handle,
        arguments,
    })
}

/// Decode a `..._operation_completed` message. The first token after the
/// handle is the completion status.
pub fn decode_operation_completed(message: &str) -> Result<OperationCompleted> {
    let (direction, name, handle, tail) = split_operation(message, "_operation_completed")?;
    let tail = tail.ok_or_else(|| Error::Parse(format!("missing completion status: {message}")))?;

    let status_end = tail.find(char::is_whitespace).unwrap_or(tail.len());
    let status = tail[..status_end].to_string();
    if status.is_empty() {
        return Err(Error::Parse(format!("missing completion status: {message}")));
    }
    let rest = &tail[status_end..];
    let arguments = if rest.is_empty() {
        None
    } else {
        Some(rest.trim_start().to_string())
    };

    Ok(OperationCompleted {
        direction,
        name,
        handle,
        status,
        arguments,
    })
}

// ---------------------------------------------------------------------------
// Holder-found reports
// ---------------------------------------------------------------------------

/// Physical position of a sample holder on the robot's cassette stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderPosition {
    Left,
    Middle,
    Right,
    Unknown,
}

impl HolderPosition {
    fn from_letter(letter: &str) -> Self {
        match letter {
            "l" => HolderPosition::Left,
            "m" => HolderPosition::Middle,
            "r" => HolderPosition::Right,
            _ => HolderPosition::Unknown,
        }
    }
}

/// Holder hardware recognised by the robot during calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolderKind {
    Cassette,
    CalibrationCassette,
    PuckAdaptor,
    Unknown,
}

impl HolderKind {
    fn from_phrase(phrase: &str) -> Self {
        match phrase {
            "calibration cassette" => HolderKind::CalibrationCassette,
            "normal cassette" => HolderKind::Cassette,
            "super puck adaptor" => HolderKind::PuckAdaptor,
            _ => HolderKind::Unknown,
        }
    }
}

/// A decoded `robot_config ... found ...` update: the robot located a
/// holder and measured its height offset.
#[derive(Debug, Clone, PartialEq)]
pub struct HolderFound {
    pub handle: String,
    pub position: HolderPosition,
    pub kind: HolderKind,
    /// Height difference against the calibrated reference, in mm.
    pub dz: f64,
}

/// Decode a holder-found update. The grammar is
/// `robot_config <handle> found <type phrase> <l|m|r> dz: <float>`
/// embedded anywhere in an operation-update message.
pub fn decode_holder_found(message: &str) -> Result<HolderFound> {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    let at = tokens
        .iter()
        .position(|t| *t == "robot_config")
        .ok_or_else(|| Error::Parse(format!("not a robot_config message: {message}")))?;

    // robot_config, handle, found, phrase (>= 1 token), position, "dz:", value
    if tokens.len() < at + 7 {
        return Err(Error::Parse(format!("holder-found message too short: {message}")));
    }
    let handle = tokens[at + 1];
    if tokens[at + 2] != "found" {
        return Err(Error::Parse(format!("not a holder-found message: {message}")));
    }

    let n = tokens.len();
    if tokens[n - 2] != "dz:" {
        return Err(Error::Parse(format!("missing dz field: {message}")));
    }
    let dz = parse_f64(tokens[n - 1])?;
    let position = HolderPosition::from_letter(tokens[n - 3]);
    let phrase = tokens[at + 3..n - 3].join(" ");
    if phrase.is_empty() {
        return Err(Error::Parse(format!("missing holder type phrase: {message}")));
    }

    Ok(HolderFound {
        handle: handle.to_string(),
        position,
        kind: HolderKind::from_phrase(&phrase),
        dz,
    })
}

// ---------------------------------------------------------------------------
// Robot force readings
// ---------------------------------------------------------------------------

/// Force measured at one cassette port.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortForce {
    /// Port is empty (`EEEE` on the wire).
    Empty,
    /// Port state unknown (`uuuu` on the wire).
    Unknown,
    /// Measured force value.
    Measured(f64),
}

/// A decoded `robot_force_<position>` string: per-port gripper force
/// readings for one cassette position.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceReading {
    pub position: String,
    pub status: String,
    /// Cassette height, in mm.
    pub height: f64,
    /// Per-port forces in wire order.
    pub forces: Vec<PortForce>,
}

/// Decode a robot-force string. Any non-numeric force token other than
/// the `EEEE`/`uuuu` sentinels is a hard failure.
pub fn decode_robot_force(message: &str) -> Result<ForceReading> {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    let at = tokens
        .iter()
        .position(|t| t.starts_with("robot_force_"))
        .ok_or_else(|| Error::Parse(format!("not a robot_force message: {message}")))?;

    let position = &tokens[at]["robot_force_".len()..];
    if position.is_empty() {
        return Err(Error::Parse(format!("missing force position: {message}")));
    }
    // status, height, and at least one force reading must follow.
    if tokens.len() < at + 4 {
        return Err(Error::Parse(format!("robot_force message too short: {message}")));
    }

    let status = tokens[at + 1].to_string();
    let height = parse_f64(tokens[at + 2])?;
    let forces = tokens[at + 3..]
        .iter()
        .map(|token| match *token {
            "EEEE" => Ok(PortForce::Empty),
            "uuuu" => Ok(PortForce::Unknown),
            other => parse_f64(other).map(PortForce::Measured),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ForceReading {
        position: position.to_string(),
        status,
        height,
        forces,
    })
}

// ---------------------------------------------------------------------------
// Cassette layout
// ---------------------------------------------------------------------------

/// Holder hardware as reported in a cassette layout string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CassetteHolderKind {
    Cassette,
    CalibrationCassette,
    PuckAdaptor,
    Bad,
    Unknown,
}

fn cassette_kind(token: &str) -> Option<CassetteHolderKind> {
    match token {
        "1" => Some(CassetteHolderKind::Cassette),
        "2" => Some(CassetteHolderKind::CalibrationCassette),
        "3" => Some(CassetteHolderKind::PuckAdaptor),
        "X" => Some(CassetteHolderKind::Bad),
        "u" => Some(CassetteHolderKind::Unknown),
        _ => None,
    }
}

/// One holder slot in a cassette layout: its type plus 96 port-state
/// tokens kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct CassetteHolder {
    /// `None` when the type token is outside the known table.
    pub kind: Option<CassetteHolderKind>,
    pub ports: Vec<String>,
}

/// A decoded `robot_cassette` string: status plus exactly three holders.
#[derive(Debug, Clone, PartialEq)]
pub struct CassetteLayout {
    pub status: String,
    pub holders: Vec<CassetteHolder>,
}

/// Decode a cassette layout string. The payload must carry exactly 291
/// tokens after the status field -- three holders of one type token and
/// 96 port tokens each; any other count is rejected.
pub fn decode_robot_cassette(message: &str) -> Result<CassetteLayout> {
    let tokens: Vec<&str> = message.split_whitespace().collect();
    let at = tokens
        .iter()
        .position(|t| *t == "robot_cassette")
        .ok_or_else(|| Error::Parse(format!("not a robot_cassette message: {message}")))?;

    let rest = &tokens[at + 1..];
    if rest.len() < CASSETTE_TOKENS + 1 {
        return Err(Error::Parse(format!(
            "robot_cassette carries {} tokens, need a status plus exactly {CASSETTE_TOKENS}",
            rest.len()
        )));
    }
    // The trailing 291 tokens are holder data; whatever precedes them is
    // the status field.
    let split = rest.len() - CASSETTE_TOKENS;
    let status = rest[..split].join(" ");
    let holders = rest[split..]
        .chunks(PORTS_PER_HOLDER + 1)
        .map(|chunk| CassetteHolder {
            kind: cassette_kind(chunk[0]),
            ports: chunk[1..].iter().map(|t| t.to_string()).collect(),
        })
        .collect();

    Ok(CassetteLayout { status, holders })
}

// ---------------------------------------------------------------------------
// Probe requests
// ---------------------------------------------------------------------------

/// One holder block in a probe request: which holder to probe plus 96
/// per-port probe flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHolder {
    pub probe_holder_type: i64,
    pub ports: Vec<i64>,
}

/// A decoded `..._start_operation robot_config ... probe ...` request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    pub operation: OperationMessage,
    pub holders: Vec<ProbeHolder>,
}

/// Decode a probe request. The operation arguments must be `probe`
/// followed by exactly 291 integers.
pub fn decode_robot_probe(message: &str) -> Result<ProbeRequest> {
    let operation = decode_start_operation(message)?;
    let arguments = operation
        .arguments
        .as_deref()
        .ok_or_else(|| Error::Parse(format!("probe request carries no arguments: {message}")))?;

    let mut tokens = arguments.split_whitespace();
    if tokens.next() != Some("probe") {
        return Err(Error::Parse(format!("not a probe request: {message}")));
    }
    let values = tokens.map(parse_i64).collect::<Result<Vec<_>>>()?;
    if values.len() != CASSETTE_TOKENS {
        return Err(Error::Parse(format!(
            "probe request carries {} values, need exactly {CASSETTE_TOKENS}",
            values.len()
        )));
    }

    let holders = values
        .chunks(PORTS_PER_HOLDER + 1)
        .map(|chunk| ProbeHolder {
            probe_holder_type: chunk[0],
            ports: chunk[1..].to_vec(),
        })
        .collect();

    Ok(ProbeRequest { operation, holders })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Operation frames ---------------------------------------------------

    #[test]
    fn start_operation_with_arguments() {
        let msg = "stog_start_operation robot_config 31.2 set_port_state mX0 u";
        let op = decode_start_operation(msg).unwrap();
        assert_eq!(op.direction, Direction::Stog);
        assert_eq!(op.name, "robot_config");
        assert_eq!(op.handle, "31.2");
        assert_eq!(op.arguments.as_deref(), Some("set_port_state mX0 u"));
    }

    #[test]
    fn start_operation_without_arguments() {
        let op = decode_start_operation("htos_start_operation centerLoop 9.2").unwrap();
        assert_eq!(op.direction, Direction::Htos);
        assert_eq!(op.arguments, None);
    }

    #[test]
    fn start_operation_unknown_direction() {
        let err = decode_start_operation("xtos_start_operation a 1.2").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn start_operation_missing_handle() {
        let err = decode_start_operation("stog_start_operation robot_config").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn operation_update_basic() {
        let msg = "stog_operation_update robot_config 31.38 port jam at m 3 A";
        let op = decode_operation_update(msg).unwrap();
        assert_eq!(op.direction, Direction::Stog);
        assert_eq!(op.name, "robot_config");
        assert_eq!(op.handle, "31.38");
        assert_eq!(op.arguments.as_deref(), Some("port jam at m 3 A"));
    }

    #[test]
    fn operation_completed_without_arguments() {
        let msg = "stog_operation_completed robot_config 31.41 aborted";
        let op = decode_operation_completed(msg).unwrap();
        assert_eq!(op.direction, Direction::Stog);
        assert_eq!(op.name, "robot_config");
        assert_eq!(op.handle, "31.41");
        assert_eq!(op.status, "aborted");
        assert_eq!(op.arguments, None);
    }

    #[test]
    fn operation_completed_with_arguments() {
        let msg = "htos_operation_completed robot_config 123.45 normal ok done";
        let op = decode_operation_completed(msg).unwrap();
        assert_eq!(op.direction, Direction::Htos);
        assert_eq!(op.status, "normal");
        assert_eq!(op.arguments.as_deref(), Some("ok done"));
    }

    #[test]
    fn operation_completed_missing_status() {
        let err = decode_operation_completed("stog_operation_completed robot_config 31.41")
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn decoding_is_deterministic() {
        let msg = "stog_start_operation robot_config 31.2 set_port_state mX0 u";
        assert_eq!(
            decode_start_operation(msg).unwrap(),
            decode_start_operation(msg).unwrap()
        );
    }

    // -- Holder-found reports -----------------------------------------------

    #[test]
    fn holder_found_calibration_cassette_left() {
        let msg = "stog_operation_update robot_config 31.4 found calibration cassette l dz: -0.300";
        let found = decode_holder_found(msg).unwrap();
        assert_eq!(found.handle, "31.4");
        assert_eq!(found.position, HolderPosition::Left);
        assert_eq!(found.kind, HolderKind::CalibrationCassette);
        assert!((found.dz - (-0.3)).abs() < 1e-12);
    }

    #[test]
    fn holder_found_normal_cassette_middle() {
        let msg = "stog_operation_update robot_config 31.8 found normal cassette m dz: -0.336";
        let found = decode_holder_found(msg).unwrap();
        assert_eq!(found.handle, "31.8");
        assert_eq!(found.position, HolderPosition::Middle);
        assert_eq!(found.kind, HolderKind::Cassette);
        assert!((found.dz - (-0.336)).abs() < 1e-12);
    }

    #[test]
    fn holder_found_super_puck_adaptor_right() {
        let msg = "stog_operation_update robot_config 31.12 found super puck adaptor r dz: 0.036";
        let found = decode_holder_found(msg).unwrap();
        assert_eq!(found.position, HolderPosition::Right);
        assert_eq!(found.kind, HolderKind::PuckAdaptor);
        assert!((found.dz - 0.036).abs() < 1e-12);
    }

    #[test]
    fn holder_found_unknown_phrase_and_letter() {
        let msg = "stog_operation_update robot_config 31.4 found something else q dz: 1.5";
        let found = decode_holder_found(msg).unwrap();
        assert_eq!(found.position, HolderPosition::Unknown);
        assert_eq!(found.kind, HolderKind::Unknown);
    }

    #[test]
    fn holder_found_bad_dz_is_hard_failure() {
        let msg = "stog_operation_update robot_config 31.4 found normal cassette m dz: abc";
        assert!(matches!(decode_holder_found(msg), Err(Error::Parse(_))));
    }

    #[test]
    fn holder_found_missing_dz_marker() {
        let msg = "stog_operation_update robot_config 31.4 found normal cassette m -0.3";
        assert!(matches!(decode_holder_found(msg), Err(Error::Parse(_))));
    }

    // -- Robot force ----------------------------------------------------------

    #[test]
    fn robot_force_mixed_readings() {
        let msg = "stog_set_string_completed robot_force_middle normal  -65.8  \
                   0.0 uuuu uuuu uuuu uuuu uuuu uuuu  0.3 \
                   -0.2 uuuu uuuu uuuu uuuu uuuu uuuu EEEE ";
        let reading = decode_robot_force(msg).unwrap();
        assert_eq!(reading.position, "middle");
        assert_eq!(reading.status, "normal");
        assert!((reading.height - (-65.8)).abs() < 1e-12);
        assert_eq!(
            reading.forces,
            vec![
                PortForce::Measured(0.0),
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Measured(0.3),
                PortForce::Measured(-0.2),
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Unknown,
                PortForce::Empty,
            ]
        );
    }

    #[test]
    fn robot_force_non_numeric_token_is_hard_failure() {
        let msg = "stog_set_string_completed robot_force_left normal -65.8 0.1 oops";
        assert!(matches!(decode_robot_force(msg), Err(Error::Parse(_))));
    }

    #[test]
    fn robot_force_bad_height_is_hard_failure() {
        let msg = "stog_set_string_completed robot_force_left normal tall 0.1";
        assert!(matches!(decode_robot_force(msg), Err(Error::Parse(_))));
    }

    #[test]
    fn robot_force_requires_readings() {
        let msg = "stog_set_string_completed robot_force_left normal -65.8";
        assert!(matches!(decode_robot_force(msg), Err(Error::Parse(_))));
    }

    // -- Cassette layout ------------------------------------------------------

    /// Build a `robot_cassette` message from three (type, ports) holders.
    fn cassette_message(prefix: &str, status: &str, holders: &[(&str, Vec<&str>)]) -> String {
        let mut msg = format!("{prefix} robot_cassette {status}");
        for (kind, ports) in holders {
            msg.push(' ');
            msg.push_str(kind);
            for port in ports {
                msg.push(' ');
                msg.push_str(port);
            }
        }
        msg
    }

    #[test]
    fn cassette_three_holders_in_order() {
        let mut mixed = vec!["1"; 32];
        mixed.extend(vec!["-"; 16]);
        mixed.extend(vec!["1"; 16]);
        mixed.extend(vec!["-"; 32]);
        assert_eq!(mixed.len(), 96);

        let msg = cassette_message(
            "stog_set_string_completed",
            "normal",
            &[
                ("X", vec!["b"; 96]),
                ("3", mixed.clone()),
                ("u", vec!["u"; 96]),
            ],
        );
        let layout = decode_robot_cassette(&msg).unwrap();

        assert_eq!(layout.status, "normal");
        assert_eq!(layout.holders.len(), 3);
        assert_eq!(layout.holders[0].kind, Some(CassetteHolderKind::Bad));
        assert_eq!(layout.holders[0].ports, vec!["b"; 96]);
        assert_eq!(layout.holders[1].kind, Some(CassetteHolderKind::PuckAdaptor));
        assert_eq!(layout.holders[1].ports, mixed);
        assert_eq!(layout.holders[2].kind, Some(CassetteHolderKind::Unknown));
        assert_eq!(layout.holders[2].ports, vec!["u"; 96]);
    }

    #[test]
    fn cassette_from_configure_string() {
        let msg = cassette_message(
            "stog_configure_string",
            "robot",
            &[
                ("1", vec!["u"; 96]),
                ("2", vec!["0"; 96]),
                ("u", vec!["u"; 96]),
            ],
        );
        let layout = decode_robot_cassette(&msg).unwrap();
        assert_eq!(layout.status, "robot");
        assert_eq!(layout.holders[0].kind, Some(CassetteHolderKind::Cassette));
        assert_eq!(
            layout.holders[1].kind,
            Some(CassetteHolderKind::CalibrationCassette)
        );
    }

    #[test]
    fn cassette_unmapped_type_token_is_none() {
        let msg = cassette_message(
            "stog_set_string_completed",
            "normal",
            &[
                ("9", vec!["u"; 96]),
                ("u", vec!["u"; 96]),
                ("u", vec!["u"; 96]),
            ],
        );
        let layout = decode_robot_cassette(&msg).unwrap();
        assert_eq!(layout.holders[0].kind, None);
    }

    #[test]
    fn cassette_wrong_token_count_is_rejected() {
        // One port short: 290 holder tokens after the status.
        let msg = cassette_message(
            "stog_set_string_completed",
            "normal",
            &[
                ("X", vec!["b"; 96]),
                ("3", vec!["1"; 96]),
                ("u", vec!["u"; 95]),
            ],
        );
        assert!(matches!(decode_robot_cassette(&msg), Err(Error::Parse(_))));
    }

    #[test]
    fn cassette_requires_the_marker() {
        assert!(matches!(
            decode_robot_cassette("stog_set_string_completed robot_force_left normal -1 0.1"),
            Err(Error::Parse(_))
        ));
    }

    // -- Probe requests -------------------------------------------------------

    /// Build a probe request from three (type, ports) holder blocks.
    fn probe_message(holders: &[(i64, Vec<i64>)]) -> String {
        let mut msg = "stog_start_operation robot_config 31.41 probe".to_string();
        for (kind, ports) in holders {
            msg.push_str(&format!(" {kind}"));
            for port in ports {
                msg.push_str(&format!(" {port}"));
            }
        }
        msg
    }

    #[test]
    fn probe_three_holders_positionally() {
        let mut second = vec![1i64; 16];
        second.extend(vec![0i64; 80]);

        let msg = probe_message(&[
            (1, vec![0; 96]),
            (0, second.clone()),
            (0, vec![0; 96]),
        ]);
        let probe = decode_robot_probe(&msg).unwrap();

        assert_eq!(probe.operation.direction, Direction::Stog);
        assert_eq!(probe.operation.name, "robot_config");
        assert_eq!(probe.operation.handle, "31.41");
        assert!(probe.operation.arguments.as_deref().unwrap().starts_with("probe 1 0 0"));

        assert_eq!(probe.holders.len(), 3);
        assert_eq!(probe.holders[0].probe_holder_type, 1);
        assert_eq!(probe.holders[0].ports, vec![0; 96]);
        assert_eq!(probe.holders[1].probe_holder_type, 0);
        assert_eq!(probe.holders[1].ports, second);
        assert_eq!(probe.holders[2].probe_holder_type, 0);
        assert_eq!(probe.holders[2].ports, vec![0; 96]);
    }

    #[test]
    fn probe_wrong_value_count_is_rejected() {
        let msg = probe_message(&[(1, vec![0; 96]), (0, vec![0; 96]), (0, vec![0; 95])]);
        assert!(matches!(decode_robot_probe(&msg), Err(Error::Parse(_))));
    }

    #[test]
    fn probe_non_integer_is_hard_failure() {
        let msg = "stog_start_operation robot_config 31.41 probe 1 x 0";
        assert!(matches!(decode_robot_probe(&msg), Err(Error::Parse(_))));
    }

    #[test]
    fn probe_requires_probe_arguments() {
        let msg = "stog_start_operation robot_config 31.41 set_port_state mX0 u";
        assert!(matches!(decode_robot_probe(&msg), Err(Error::Parse(_))));

        let msg = "stog_start_operation robot_config 31.41";
        assert!(matches!(decode_robot_probe(&msg), Err(Error::Parse(_))));
    }
}
