//! Построение параметров стиля для фильтра `showwavespic`
//!
//! Стиль задаётся либо готовой строкой, либо функцией от размеров картинки.
//! Строка дописывается сразу после `showwavespic=s=WxH`, поэтому обычно
//! начинается с `:` (опции фильтра) или `,` (следующий фильтр в цепочке).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Функция, вычисляющая стиль по ширине и высоте картинки
pub type StyleFn = dyn Fn(u32, u32) -> String + Send + Sync;

/// Стиль отрисовки волны
#[derive(Clone)]
pub enum FilterStyle {
    /// Готовая строка, например `:colors=gray`
    Literal(String),
    /// Стиль, зависящий от размеров картинки
    Computed(Arc<StyleFn>),
}

impl FilterStyle {
    pub fn literal(style: impl Into<String>) -> Self {
        Self::Literal(style.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(u32, u32) -> String + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Строка стиля для картинки заданного размера
    pub fn build(&self, width_px: u32, height_px: u32) -> String {
        match self {
            Self::Literal(style) => style.clone(),
            Self::Computed(f) => (f.as_ref())(width_px, height_px),
        }
    }
}

/// Стиль по умолчанию: серая волна и полупрозрачная сетка
/// (10 колонок по ширине, 2 ряда по высоте).
pub fn grid_style(width_px: u32, height_px: u32) -> String {
    let cell_w = (width_px / 10).max(1);
    let cell_h = (height_px / 2).max(1);
    format!(
        ":colors=gray,drawgrid=w={}:h={}:t=1:c=white@0.25",
        cell_w, cell_h
    )
}

impl Default for FilterStyle {
    fn default() -> Self {
        Self::computed(grid_style)
    }
}

impl fmt::Debug for FilterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(style) => f.debug_tuple("Literal").field(style).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

// В конфигурации стиль хранится только строкой.
impl Serialize for FilterStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Literal(style) => serializer.serialize_str(style),
            Self::Computed(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for FilterStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let style: Option<String> = Option::deserialize(deserializer)?;
        Ok(style.map(FilterStyle::Literal).unwrap_or_default())
    }
}

/// Параметры стиля для запроса рендеринга
pub fn build_filter_args(style: &FilterStyle, width_px: u32, height_px: u32) -> String {
    style.build(width_px, height_px)
}
