use std::io::Write;

/// `current/total` counter redrawn in place on stderr.
pub struct Progress {
    enabled: bool,
    label: &'static str,
    total: usize,
}

impl Progress {
    pub fn new(enabled: bool, label: &'static str, total: usize) -> Self {
        Self {
            enabled,
            label,
            total,
        }
    }

    pub fn tick(&self, current: usize) {
        if !self.enabled {
            return;
        }
        let width = self.total.to_string().len();
        let mut err = std::io::stderr().lock();
        let _ = write!(
            err,
            "\r{} {:>width$}/{:>width$}",
            self.label, current, self.total
        );
        if current >= self.total {
            let _ = writeln!(err);
        }
        let _ = err.flush();
    }
}
