//! Begin/complete logging around a long-running operation

use std::time::Instant;

use super::logger::Logger;

/// Logs `{name}_BEGIN` on creation and exactly one of `{name}_COMPLETE`,
/// `{name}_FAILED` or `{name}_INCOMPLETE` (dropped without an outcome).
///
/// Holds no borrowed state so it can live across `.await` points.
pub struct ObservationScope {
    name: &'static str,
    fields: Vec<(&'static str, String)>,
    started: Instant,
    finished: bool,
}

impl ObservationScope {
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Fields are repeated on every event of the scope
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let fields: Vec<(&'static str, String)> =
            fields.iter().map(|(k, v)| (*k, v.to_string())).collect();
        let scope = Self {
            name,
            fields,
            started: Instant::now(),
            finished: false,
        };
        Logger::info(&format!("{}_BEGIN", name), &scope.field_refs());
        scope
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.finished = true;
        let elapsed = self.elapsed_ms();
        let mut fields = self.field_refs();
        fields.push(("elapsed_ms", &elapsed));
        fields.extend_from_slice(extra);
        Logger::info(&format!("{}_COMPLETE", self.name), &fields);
    }

    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        let elapsed = self.elapsed_ms();
        let mut fields = self.field_refs();
        fields.push(("elapsed_ms", &elapsed));
        fields.push(("reason", reason));
        Logger::error(&format!("{}_FAILED", self.name), &fields);
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn elapsed_ms(&self) -> String {
        self.started.elapsed().as_millis().to_string()
    }

    fn field_refs(&self) -> Vec<(&str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.finished {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("reason", "scope dropped without outcome")],
            );
        }
    }
}
