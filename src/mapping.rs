//! Перевод координат указателя в миллисекунды

use crate::window::TimeWindow;

/// Время, соответствующее пикселю `x_px` на картинке шириной `image_width_px`.
///
/// `floor(start + x / width * (stop - start))`, считается в целых числах.
/// `x_px` зажимается в `[0, image_width_px]`, поэтому результат всегда лежит
/// в `[start, stop]`: левый край даёт `start`, правый - `stop`.
/// Незажатая формула за пределами картинки продолжала бы шкалу линейно
/// (левее нуля - раньше начала окна, правее ширины - позже конца).
pub fn pixel_to_ms(x_px: i64, image_width_px: u32, window: &TimeWindow) -> u64 {
    if image_width_px == 0 {
        return window.start_ms();
    }
    let width = u128::from(image_width_px);
    let x = x_px.clamp(0, i64::from(image_width_px)) as u128;
    let offset = x * u128::from(window.duration_ms()) / width;
    window.start_ms() + offset as u64
}

/// Перевод расстояния перетаскивания в миллисекунды:
/// `floor((x_start - x_end) / (pixels_per_second / 1000))`.
///
/// Перетаскивание влево даёт положительное значение.
pub fn drag_delta_to_ms(x_start_px: i64, x_end_px: i64, pixels_per_second: f64) -> i64 {
    if !pixels_per_second.is_finite() || pixels_per_second <= 0.0 {
        return 0;
    }
    // Деление на (pps / 1000) переписано как умножение на 1000,
    // чтобы целые входы давали точный результат.
    let distance = x_start_px.saturating_sub(x_end_px) as f64;
    (distance * 1000.0 / pixels_per_second).floor() as i64
}
