use indicatif::{ProgressBar, ProgressStyle};

pub fn batch_bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix:<10} {bar:40.cyan/blue} {percent:>3}% {pos}/{len} images [{elapsed_precise}<{eta_precise}] {msg}",
    )
    .expect("invalid batch bar template")
}

/// Bar over `total` images, or a hidden one for single-image runs.
pub fn batch_bar(total: usize) -> ProgressBar {
    if total <= 1 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total as u64);
    bar.set_style(batch_bar_style());
    bar.set_prefix("masking");
    bar
}
