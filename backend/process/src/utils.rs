use image::{GrayImage, Luma};
use indicatif::{ProgressBar, ProgressStyle};
use menu::ordering::OrderViolation;
use qrcode::{QrCode, types::QrError};

/// Pixels per QR module.
pub const QR_BOX_SIZE: u32 = 10;
/// Quiet zone around the code, in modules.
pub const QR_BORDER: u32 = 4;

pub fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);

    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }

    pb
}

pub fn describe(violation: &OrderViolation) -> String {
    match violation {
        OrderViolation::ItemOrderGap { category, found } => {
            format!("{category}: item orders {} instead of 1..{}", list(found), found.len())
        }
        OrderViolation::CategoryOrderSplit { category, found } => {
            format!("{category}: items disagree on category order ({})", list(found))
        }
        OrderViolation::CategoryOrderGap { found } => {
            format!("category orders {} are not one per category", list(found))
        }
    }
}

/// Black on white, with a four module quiet zone.
pub fn menu_qr(url: &str) -> Result<GrayImage, QrError> {
    let code = QrCode::new(url.as_bytes())?;

    Ok(code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(QR_BOX_SIZE, QR_BOX_SIZE)
        .build())
}

fn list(orders: &[u32]) -> String {
    orders
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
