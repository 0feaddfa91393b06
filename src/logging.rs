use log::{Level, Log, Record};

/// A handle through which every operation of this crate emits its log records.
///
/// The process-wide logger is installed once by the binary; library code only ever
/// writes to the sink it was handed, so callers (and tests) decide where records go.
#[derive(Clone, Copy)]
pub struct Logger<'a> {
    sink: &'a dyn Log,
    target: &'a str,
}

impl<'a> Logger<'a> {
    pub fn new(sink: &'a dyn Log, target: &'a str) -> Self {
        Self { sink, target }
    }

    /// A [`Logger`] writing to whatever was installed via [`log::set_logger`]
    pub fn global() -> Logger<'static> {
        Logger {
            sink: log::logger(),
            target: module_path!(),
        }
    }

    fn emit(&self, level: Level, args: std::fmt::Arguments) {
        let metadata = log::Metadata::builder()
            .level(level)
            .target(self.target)
            .build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .build(),
        );
    }

    pub fn debug(&self, args: std::fmt::Arguments) {
        self.emit(Level::Debug, args)
    }

    pub fn info(&self, args: std::fmt::Arguments) {
        self.emit(Level::Info, args)
    }

    pub fn warn(&self, args: std::fmt::Arguments) {
        self.emit(Level::Warn, args)
    }

    pub fn error(&self, args: std::fmt::Arguments) {
        self.emit(Level::Error, args)
    }
}
