//! Plain-text rendering of results, datasets and notices

use shared::{DatasetInfo, PredictionResult};
use std::fmt::Write;

use crate::workflow::Notice;

/// Related dataset images shown next to a result
pub const RELATED_SAMPLE_LIMIT: usize = 4;

pub fn render_notice(notice: &Notice) -> String {
    let marker = if notice.event.is_destructive() { "!" } else { "*" };
    format!(
        "[{}] {} {}: {}",
        notice.at.format("%H:%M:%S"),
        marker,
        notice.event.title(),
        notice.event.description()
    )
}

pub fn render_result(result: Option<&PredictionResult>, dataset: Option<&DatasetInfo>) -> String {
    let Some(result) = result else {
        return "No Results Available\nUpload an image first to see classification results\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "Classification Results");
    if let Some(image) = &result.image {
        let _ = writeln!(out, "  Uploaded image:   {}", image);
    }
    let _ = writeln!(out, "  Detected missile: {}", result.label);
    let _ = writeln!(out, "  Confidence:       {}%", result.confidence_percent());
    let _ = writeln!(
        out,
        "  Threat level:     {} ({})",
        result.threat,
        result.threat.badge_variant()
    );
    let _ = writeln!(out, "  Description:      {}", result.description);
    let _ = writeln!(out, "  Model:            {}", result.model);
    let _ = writeln!(out, "  Inference time:   {}ms", result.inference_time_ms);

    if let Some(metrics) = &result.metrics {
        let _ = writeln!(out, "Model metrics");
        let rows = [
            ("accuracy", metrics.accuracy),
            ("precision", metrics.precision),
            ("recall", metrics.recall),
            ("f1_score", metrics.f1_score),
        ];
        for (name, value) in rows {
            if let Some(value) = value {
                let _ = writeln!(out, "  {:<10} {:.1}%", name, value * 100.0);
            }
        }
        if let Some(support) = metrics.support {
            let _ = writeln!(out, "  {:<10} {}", "support", support);
        }
    }

    if let Some(dataset) = dataset {
        let _ = writeln!(out, "Related dataset images ({})", result.label);
        let mut any = false;
        for sample in dataset.samples_for_label(&result.label, RELATED_SAMPLE_LIMIT) {
            any = true;
            let _ = writeln!(out, "  #{} {} [{}]", sample.id, sample.filename, sample.split);
        }
        if !any {
            let _ = writeln!(out, "  none in sample table");
        }
    }

    out
}

pub fn render_dataset(dataset: Option<&DatasetInfo>) -> String {
    let Some(dataset) = dataset else {
        return "Loading dataset...\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", dataset.name);
    let _ = writeln!(out, "  Source:       {}", dataset.source);
    let _ = writeln!(out, "  Total images: {}", dataset.total_images);
    let _ = writeln!(out, "  Classes:      {}", dataset.classes.join(", "));

    let _ = writeln!(out, "Resolution distribution");
    for (resolution, count) in &dataset.resolution_distribution {
        let _ = writeln!(out, "  {:<10} {}", resolution, count);
    }

    let _ = writeln!(out, "Split");
    for (name, percent) in dataset.split.entries() {
        let _ = writeln!(out, "  {:<6} {}%", name, percent);
    }

    let _ = writeln!(out, "Sample data ({} examples)", dataset.samples.len());
    let _ = writeln!(out, "  {:<4} {:<22} {:<14} {}", "ID", "Filename", "Label", "Split");
    for sample in &dataset.samples {
        let _ = writeln!(
            out,
            "  {:<4} {:<22} {:<14} {}",
            sample.id, sample.filename, sample.label, sample.split
        );
    }

    out
}
