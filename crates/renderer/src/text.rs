use crate::frame::{ChannelFrame, Frame};
use hygro_core::Mode;
use hygro_regression::FitResult;
use std::fmt::Write;

/// Shown in the metrics panel until the first fit exists.
pub const METRICS_PLACEHOLDER: &str = "Regression statistics load automatically...";

/// `Points: N | Mode: <mode>`
pub fn status_line(points: usize, mode: Mode) -> String {
    format!("Points: {points} | Mode: {mode}")
}

/// Regression panel text for a frame; empty while there is nothing fitted.
pub fn metrics_text(frame: &Frame) -> String {
    if !frame.has_fits() {
        return String::new();
    }
    match frame.mode {
        Mode::Both => frame
            .channels
            .iter()
            .map(channel_block)
            .collect::<Vec<_>>()
            .join("\n\n"),
        _ => frame.channels.first().map(single_block).unwrap_or_default(),
    }
}

fn single_block(channel: &ChannelFrame) -> String {
    let mut out = String::new();
    if let Some(linear) = &channel.linear {
        let fit = &linear.fit;
        let _ = writeln!(out, "=== LINEAR ===");
        let _ = writeln!(
            out,
            "Equation: y = {:.2}x + {:.2}",
            fit.coefficient(1),
            fit.coefficient(0)
        );
        let _ = write!(out, "{}", score(fit));
    }
    if let Some(quadratic) = &channel.quadratic {
        let fit = &quadratic.fit;
        let _ = writeln!(out, "\n\n=== QUADRATIC ===");
        let _ = writeln!(
            out,
            "Equation: y = {:.4}x² + {:.2}x + {:.2}",
            fit.coefficient(2),
            fit.coefficient(1),
            fit.coefficient(0)
        );
        let _ = write!(out, "{}", score(fit));
    }
    out
}

fn channel_block(channel: &ChannelFrame) -> String {
    let mut out = format!("=== {} ===", channel.channel.label());
    if let Some(linear) = &channel.linear {
        let fit = &linear.fit;
        let _ = write!(
            out,
            "\nLINE: y={:.2}x+{:.2}\n{}",
            fit.coefficient(1),
            fit.coefficient(0),
            compact_score(fit)
        );
    }
    if let Some(quadratic) = &channel.quadratic {
        let fit = &quadratic.fit;
        let _ = write!(
            out,
            "\nPARABOLA: y={:.4}x²+{:.2}x+{:.2}\n{}",
            fit.coefficient(2),
            fit.coefficient(1),
            fit.coefficient(0),
            compact_score(fit)
        );
    }
    out
}

fn score(fit: &FitResult) -> String {
    let m = fit.metrics;
    format!("MSE: {:.2} | RMSE: {:.2} | R²: {:.4}", m.mse, m.rmse, m.r_squared)
}

fn compact_score(fit: &FitResult) -> String {
    let m = fit.metrics;
    format!("  MSE:{:6.2}  RMSE:{:5.2}  R²:{:.4}", m.mse, m.rmse, m.r_squared)
}
