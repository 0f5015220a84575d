//! Жесты мыши на картинке волны и соответствующие правки времени
//!
//! | Жест                                | Действие                                               |
//! |-------------------------------------|--------------------------------------------------------|
//! | левая кнопка                        | начало субтитра = время под курсором                   |
//! | Ctrl + левая                        | то же, конец предыдущего = начало - зазор              |
//! | Shift + левая, перетаскивание       | начало раньше на длину перетаскивания                  |
//! | Shift + левая, клик                 | начало раньше на `step_ms`                             |
//! | правая кнопка                       | конец субтитра = время под курсором                    |
//! | Ctrl + правая                       | то же, начало следующего = конец + зазор               |
//! | Shift + правая, перетаскивание      | конец позже на длину перетаскивания                    |
//! | Shift + правая, клик                | конец позже на `step_ms`                               |
//! | средняя кнопка                      | переход плеера и прослушивание                         |
//!
//! Shift важнее Ctrl. Без Shift перетаскивание обрабатывается как клик
//! в точке отпускания.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::WaveformConfig;
use crate::host::DocumentModel;
use crate::mapping::{drag_delta_to_ms, pixel_to_ms};
use crate::playback::{SampleScheduler, clamp_sample_ms};
use crate::window::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        control: false,
        shift: false,
    };
    pub const CONTROL: Modifiers = Modifiers {
        control: true,
        shift: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        control: false,
        shift: true,
    };
}

/// Что делает жест, без учёта координат
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SetStart,
    SetStartAndPreviousStop,
    DragStartBackward,
    StepStartBackward,
    SetStop,
    SetStopAndNextStart,
    DragStopForward,
    StepStopForward,
    Preview,
}

/// Событие указателя на картинке
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Координата x (для перетаскивания - точка отпускания)
    pub x_px: i64,
    pub image_width_px: u32,
    /// Окно, которое изображает картинка
    pub window: TimeWindow,
}

impl PointerEvent {
    pub fn time_ms(&self) -> u64 {
        pixel_to_ms(self.x_px, self.image_width_px, &self.window)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub button: Button,
    pub modifiers: Modifiers,
    pub event: PointerEvent,
    /// Откуда началось перетаскивание; `None` - обычный клик
    pub drag_from_px: Option<i64>,
}

impl Gesture {
    pub fn click(button: Button, modifiers: Modifiers, event: PointerEvent) -> Self {
        Self {
            button,
            modifiers,
            event,
            drag_from_px: None,
        }
    }

    pub fn drag(button: Button, modifiers: Modifiers, from_px: i64, event: PointerEvent) -> Self {
        Self {
            button,
            modifiers,
            event,
            drag_from_px: Some(from_px),
        }
    }

    pub fn is_drag(&self) -> bool {
        self.drag_from_px.is_some()
    }

    pub fn action(&self) -> Action {
        classify(self.button, self.modifiers, self.is_drag())
    }
}

/// Чистое сопоставление жеста действию
pub fn classify(button: Button, modifiers: Modifiers, is_drag: bool) -> Action {
    match (button, modifiers.shift, modifiers.control) {
        (Button::Primary, true, _) if is_drag => Action::DragStartBackward,
        (Button::Primary, true, _) => Action::StepStartBackward,
        (Button::Primary, false, true) => Action::SetStartAndPreviousStop,
        (Button::Primary, false, false) => Action::SetStart,
        (Button::Secondary, true, _) if is_drag => Action::DragStopForward,
        (Button::Secondary, true, _) => Action::StepStopForward,
        (Button::Secondary, false, true) => Action::SetStopAndNextStart,
        (Button::Secondary, false, false) => Action::SetStop,
        (Button::Middle, _, _) => Action::Preview,
    }
}

/// Итог обработки жеста
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Времена в документе изменены
    Edited(Action),
    /// Плеер переведён к `ms`; `sample_ms == 0` - без прослушивания
    Previewed { ms: u64, sample_ms: u64 },
    /// Курсор не на субтитре, ничего не сделано
    Ignored,
}

/// Правка с сохранением положения курсора и уведомлением документа
fn edit<D: DocumentModel>(doc: &mut D, f: impl FnOnce(&mut D)) {
    let position = doc.position();
    f(doc);
    doc.restore_position(position);
    doc.times_adjusted();
}

/// Выполнить жест над документом и плеером
pub fn dispatch<D: DocumentModel>(
    gesture: &Gesture,
    doc: &mut D,
    scheduler: &mut SampleScheduler,
    config: &WaveformConfig,
) -> Dispatched {
    if doc.current_start_ms().is_none() {
        debug!("Gesture outside of a subtitle, ignoring");
        return Dispatched::Ignored;
    }

    let action = gesture.action();
    let ms = gesture.event.time_ms();
    let drag_ms = gesture
        .drag_from_px
        .map(|from| drag_delta_to_ms(from, gesture.event.x_px, config.pixels_per_second))
        .unwrap_or(0);
    let step_ms = i64::try_from(config.step_ms).unwrap_or(i64::MAX);

    match action {
        Action::SetStart => edit(doc, |doc| doc.set_start_ms(ms)),
        Action::SetStartAndPreviousStop => edit(doc, |doc| {
            doc.set_start_ms(ms);
            let spacing = doc.spacing_ms();
            if doc.backward_entry() {
                doc.set_stop_ms(ms.saturating_sub(spacing));
            }
        }),
        Action::DragStartBackward => edit(doc, |doc| doc.adjust_start_ms(drag_ms.saturating_neg())),
        Action::StepStartBackward => edit(doc, |doc| doc.adjust_start_ms(step_ms.saturating_neg())),
        Action::SetStop => edit(doc, |doc| doc.set_stop_ms(ms)),
        Action::SetStopAndNextStart => edit(doc, |doc| {
            doc.set_stop_ms(ms);
            let spacing = doc.spacing_ms();
            if doc.forward_entry() {
                doc.set_start_ms(ms.saturating_add(spacing));
            }
        }),
        Action::DragStopForward => edit(doc, |doc| doc.adjust_stop_ms(drag_ms)),
        Action::StepStopForward => edit(doc, |doc| doc.adjust_stop_ms(step_ms)),
        Action::Preview => {
            let sample_ms = clamp_sample_ms(ms, config.sample_ms, doc.current_stop_ms());
            scheduler.play_sample(ms, sample_ms);
            return Dispatched::Previewed { ms, sample_ms };
        }
    }

    Dispatched::Edited(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_button_table() {
        assert_eq!(classify(Button::Primary, Modifiers::NONE, false), Action::SetStart);
        assert_eq!(
            classify(Button::Primary, Modifiers::CONTROL, false),
            Action::SetStartAndPreviousStop
        );
        assert_eq!(classify(Button::Primary, Modifiers::SHIFT, true), Action::DragStartBackward);
        assert_eq!(classify(Button::Primary, Modifiers::SHIFT, false), Action::StepStartBackward);
    }

    #[test]
    fn secondary_button_table() {
        assert_eq!(classify(Button::Secondary, Modifiers::NONE, false), Action::SetStop);
        assert_eq!(
            classify(Button::Secondary, Modifiers::CONTROL, false),
            Action::SetStopAndNextStart
        );
        assert_eq!(classify(Button::Secondary, Modifiers::SHIFT, true), Action::DragStopForward);
        assert_eq!(classify(Button::Secondary, Modifiers::SHIFT, false), Action::StepStopForward);
    }

    #[test]
    fn middle_always_previews() {
        for modifiers in [Modifiers::NONE, Modifiers::CONTROL, Modifiers::SHIFT] {
            for is_drag in [false, true] {
                assert_eq!(classify(Button::Middle, modifiers, is_drag), Action::Preview);
            }
        }
    }

    #[test]
    fn shift_wins_over_control_and_plain_drag_is_click() {
        let both = Modifiers {
            control: true,
            shift: true,
        };
        assert_eq!(classify(Button::Primary, both, true), Action::DragStartBackward);
        assert_eq!(classify(Button::Secondary, both, false), Action::StepStopForward);
        assert_eq!(classify(Button::Primary, Modifiers::NONE, true), Action::SetStart);
        assert_eq!(
            classify(Button::Secondary, Modifiers::CONTROL, true),
            Action::SetStopAndNextStart
        );
    }

    #[test]
    fn event_resolves_time_from_window() {
        let window = TimeWindow::new(2000, 5000).unwrap();
        let event = PointerEvent {
            x_px: 225,
            image_width_px: 225,
            window,
        };
        assert_eq!(event.time_ms(), 5000);
        let gesture = Gesture::drag(Button::Primary, Modifiers::SHIFT, 300, event);
        assert!(gesture.is_drag());
        assert_eq!(gesture.action(), Action::DragStartBackward);
    }
}
