//! Run configuration registry.
//!
//! The bus stores data-collection run configurations as positional strings
//! -- the wire format has no field keys, so a record is only meaningful
//! against the fixed [`RUN_FIELDS`] order and every mutation re-serializes
//! the whole record. [`RunRegistry`] folds the current state from observed
//! `run*` notifications (never by direct query), and [`Runs`] layers the
//! mutating operations on top of a [`DcssClient`] with the registry
//! attached as its dispatch observer.

use std::collections::HashMap;

use dcss_core::{Error, Frame, Result, Transport};

use crate::client::{ClientOptions, DcssClient, FrameObserver};

/// Field order of one run configuration slot. Serialization must
/// reproduce this order exactly.
pub const RUN_FIELDS: [&str; 23] = [
    "status",
    "next_frame",
    "run_label",
    "file_root",
    "directory",
    "start_frame",
    "axis_motor",
    "start_angle",
    "end_angle",
    "delta",
    "wedge_size",
    "exposure_time",
    "distance",
    "beam_stop",
    "attenuation",
    "num_energy",
    "energy1",
    "energy2",
    "energy3",
    "energy4",
    "energy5",
    "detector_mode",
    "inverse_on",
];

/// Number of run slots the bus exposes.
pub const RUN_SLOTS: u32 = 17;

/// Resolve the historical field aliases.
fn canonical_field(name: &str) -> &str {
    match name {
        "prefix" => "file_root",
        "energy" => "energy1",
        other => other,
    }
}

fn field_index(name: &str) -> Option<usize> {
    let name = canonical_field(name);
    RUN_FIELDS.iter().position(|field| *field == name)
}

/// The slot number encoded in a slot name, e.g. `run3` -> 3.
/// The meta-slot `runs` has none.
fn slot_number(slot: &str) -> Option<u32> {
    slot.strip_prefix("run")?.parse().ok()
}

/// Ordered field values for one run configuration slot.
///
/// A record observed with fewer tokens than the schema has fields keeps
/// only the observed prefix; setting a later field pads the gap so
/// serialization stays positional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRecord {
    values: Vec<String>,
}

impl RunRecord {
    /// Build a record from wire tokens, pairing them with [`RUN_FIELDS`]
    /// positionally. Tokens beyond the schema are dropped.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        RunRecord {
            values: tokens
                .into_iter()
                .take(RUN_FIELDS.len())
                .map(|t| t.to_string())
                .collect(),
        }
    }

    /// Look a field up by name (aliases resolve).
    pub fn get(&self, field: &str) -> Option<&str> {
        let idx = field_index(field)?;
        self.values.get(idx).map(String::as_str)
    }

    /// Set a field by name (aliases resolve). Returns `false` for names
    /// outside the schema, leaving the record untouched.
    pub fn set(&mut self, field: &str, value: &str) -> bool {
        let Some(idx) = field_index(field) else {
            return false;
        };
        if idx >= self.values.len() {
            self.values.resize(idx + 1, String::new());
        }
        self.values[idx] = value.to_string();
        true
    }

    /// The run's `status` field.
    pub fn status(&self) -> Option<&str> {
        self.get("status")
    }

    /// Re-serialize every field in wire order.
    pub fn serialize(&self) -> String {
        self.values.join(" ")
    }
}

/// Run configuration state folded from observed notifications.
///
/// Attached to a client as its dispatch observer; the registry watches
/// `stog_set_string_completed run*` and `stog_configure_string run*`
/// frames and replaces the affected slot wholesale on each one.
#[derive(Debug, Default)]
pub struct RunRegistry {
    records: HashMap<String, RunRecord>,
    meta: Vec<String>,
}

impl RunRegistry {
    /// The record for one slot, if it has been observed.
    pub fn record(&self, slot: &str) -> Option<&RunRecord> {
        self.records.get(slot)
    }

    /// All observed slot records.
    pub fn records(&self) -> &HashMap<String, RunRecord> {
        &self.records
    }

    /// The schema-less `runs` meta-slot, as raw tokens. Empty until the
    /// bus first pushes it.
    pub fn meta(&self) -> &[String] {
        &self.meta
    }

    /// The slot whose `status` field is `active`, if any.
    pub fn active_run(&self) -> Option<(&str, &RunRecord)> {
        self.records
            .iter()
            .find(|(_, record)| record.status() == Some("active"))
            .map(|(slot, record)| (slot.as_str(), record))
    }

    fn fold(&mut self, slot: &str, data: &[&str]) {
        if slot == "runs" {
            self.meta = data.iter().map(|t| t.to_string()).collect();
        }
        if slot_number(slot).is_some() {
            self.records
                .insert(slot.to_string(), RunRecord::from_tokens(data.iter().copied()));
        }
    }
}

impl FrameObserver for RunRegistry {
    fn on_frame(&mut self, frame: &Frame) {
        if frame.name() != "stog_set_string_completed" && frame.name() != "stog_configure_string" {
            return;
        }
        let args = frame.args();
        if !args.starts_with("run") {
            return;
        }
        let mut tokens = args.split_whitespace();
        let Some(slot) = tokens.next() else {
            return;
        };
        // The first data token is the echoing peer's identity, not record
        // data.
        let data: Vec<&str> = tokens.skip(1).collect();
        self.fold(slot, &data);
    }
}

/// Client with the run registry attached, plus the run-management
/// operations built on the correlation layer.
pub struct Runs<T: Transport> {
    client: DcssClient<T, RunRegistry>,
}

impl<T: Transport> Runs<T> {
    pub fn new(transport: T, options: ClientOptions) -> Self {
        Runs {
            client: DcssClient::with_observer(transport, options, RunRegistry::default()),
        }
    }

    pub fn client(&self) -> &DcssClient<T, RunRegistry> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut DcssClient<T, RunRegistry> {
        &mut self.client
    }

    /// The observed registry state.
    pub fn registry(&self) -> &RunRegistry {
        self.client.observer()
    }

    pub async fn login(&mut self) -> Result<()> {
        self.client.login().await
    }

    pub async fn become_master(&mut self, force: bool) -> Result<bool> {
        self.client.become_master(force).await
    }

    async fn runs_config(&mut self, verb: &str, run_no: Option<u32>) -> Result<()> {
        let user = self.client.options().user.clone();
        let run_no = run_no.map(|n| n.to_string());
        let mut args = vec![user.as_str(), verb];
        if let Some(run_no) = run_no.as_deref() {
            args.push(run_no);
        }
        self.client.run_operation("runsConfig", &args).await?;
        Ok(())
    }

    /// Append a new run slot.
    pub async fn add_run(&mut self) -> Result<()> {
        self.runs_config("addNewRun", None).await
    }

    /// Delete one run slot.
    pub async fn delete_run(&mut self, run_no: u32) -> Result<()> {
        self.runs_config("deleteRun", Some(run_no)).await
    }

    /// Reset one run slot to its defaults.
    pub async fn reset_run(&mut self, run_no: u32) -> Result<()> {
        self.runs_config("resetRun", Some(run_no)).await
    }

    /// Reset every slot. The bus's own resetAllRuns operation fails, so
    /// slots are reset one at a time.
    pub async fn reset_all(&mut self) -> Result<()> {
        for run_no in 0..RUN_SLOTS {
            self.reset_run(run_no).await?;
        }
        Ok(())
    }

    /// Hide every run from the GUI run list.
    pub async fn hide_all(&mut self) -> Result<()> {
        self.show_runs(0).await
    }

    /// Show runs up to `run_no`, but only if fewer are currently shown.
    pub async fn show_if_hidden(&mut self, run_no: u32) -> Result<()> {
        self.client.ensure_ready().await?;
        let shown = {
            let meta = self.client.observer().meta();
            let first = meta.first().ok_or_else(|| {
                Error::ProtocolViolation("runs directory has not been observed".to_string())
            })?;
            first
                .parse::<i64>()
                .map_err(|_| Error::Parse(format!("malformed runs directory entry: {first}")))?
        };
        if shown < i64::from(run_no) {
            self.show_runs(run_no).await?;
        }
        Ok(())
    }

    /// Show runs up to `run_no` by rewriting the head of the `runs`
    /// meta-slot and pushing it back whole.
    pub async fn show_runs(&mut self, run_no: u32) -> Result<()> {
        self.client.ensure_ready().await?;
        let mut meta = self.client.observer().meta().to_vec();
        if meta.len() < 2 {
            return Err(Error::ProtocolViolation(
                "runs directory has not been observed".to_string(),
            ));
        }
        meta[0] = run_no.to_string();
        meta[1] = run_no.to_string();
        self.client.set_string("runs", &meta.join(" ")).await
    }

    /// Update fields of one run slot by name (aliases resolve; names
    /// outside the schema are ignored) and push the whole record back.
    /// Partial updates are never sent -- the wire format has no field
    /// keys.
    pub async fn set_run(&mut self, slot: &str, updates: &[(&str, &str)]) -> Result<()> {
        self.client.ensure_ready().await?;
        let mut record = self
            .client
            .observer()
            .record(slot)
            .cloned()
            .ok_or_else(|| Error::InvalidParameter(format!("unknown run slot: {slot}")))?;
        for (field, value) in updates {
            record.set(field, value);
        }
        self.client.set_string(slot, &record.serialize()).await
    }

    /// Start collecting one run. Returns the completion frame text.
    pub async fn start_run(&mut self, run_no: u32) -> Result<String> {
        self.client.ensure_ready().await?;
        let run_no = run_no.to_string();
        let user = self.client.options().user.clone();
        let session_id = self.client.options().session_id.clone();
        self.client
            .run_operation("collectRun", &[&run_no, &user, "0", &session_id])
            .await
    }

    /// The slot currently collecting, if any.
    pub async fn active_run(&mut self) -> Result<Option<(String, RunRecord)>> {
        self.client.ensure_ready().await?;
        Ok(self
            .client
            .observer()
            .active_run()
            .map(|(slot, record)| (slot.to_string(), record.clone())))
    }
}
