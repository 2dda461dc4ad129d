use spin::Once;

pub type PrintSink = fn(&str);

static PRINT_SINK: Once<PrintSink> = Once::new();

/// Installs the kernel console writer. The first sink wins; output before
/// that is dropped.
pub fn set_print_sink(sink: PrintSink) -> bool {
    let mut installed = false;
    PRINT_SINK.call_once(|| {
        installed = true;
        sink
    });
    installed
}

#[inline]
pub fn print(s: &str) {
    if let Some(sink) = PRINT_SINK.get() {
        sink(s);
    }
}
