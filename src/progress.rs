use indicatif::{ProgressBar, ProgressBarIter, ProgressFinish, ProgressStyle};

const TEMPLATE: &str = "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}";

/// Wrap `iter` in a progress bar drawn on stderr.
///
/// Items pass through unchanged and in order. Nothing is drawn when stderr is
/// not a terminal.
pub fn track<I>(label: &str, iter: I) -> ProgressBarIter<I>
where
    I: ExactSizeIterator,
{
    let style =
        ProgressStyle::with_template(TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar());
    let pb = ProgressBar::new(iter.len() as u64)
        .with_style(style)
        .with_message(label.to_string())
        .with_finish(ProgressFinish::AndLeave);
    pb.wrap_iter(iter)
}
