//! minifb preview window.
//!
//! The window is both the display and the keyboard, so one window is shared
//! between a [`PreviewDisplay`] and a [`KeyboardCommands`]. Everything stays on
//! the loop thread.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::debug;

use crate::camera_control::common::error::{ControlError, Result};
use crate::camera_control::frame::Frame;
use crate::camera_control::mode::Command;
use crate::camera_control::operator::{CommandSource, DisplaySink};

struct PreviewWindow {
    window: Window,
    title: String,
    overlay: String,
    buffer: Vec<u32>,
    pending: VecDeque<Command>,
}

/// Opens a window sized for `width`×`height` frames.
pub fn open_preview(title: &str, width: usize, height: usize) -> Result<(PreviewDisplay, KeyboardCommands)> {
    let window = Window::new(title, width, height, WindowOptions::default())
        .map_err(|e| ControlError::Display(e.to_string()))?;

    let shared = Rc::new(RefCell::new(PreviewWindow {
        window,
        title: title.to_string(),
        overlay: String::new(),
        buffer: Vec::with_capacity(width * height),
        pending: VecDeque::new(),
    }));

    Ok((
        PreviewDisplay { window: Rc::clone(&shared) },
        KeyboardCommands { window: shared },
    ))
}

pub struct PreviewDisplay {
    window: Rc<RefCell<PreviewWindow>>,
}

impl DisplaySink for PreviewDisplay {
    fn show(&mut self, frame: &Frame<'_>, overlay: &str) -> Result<()> {
        let mut preview = self.window.borrow_mut();
        let preview = &mut *preview;

        preview.buffer.clear();
        preview.buffer.extend(
            frame
                .pixels()
                .map(|[r, g, b]| (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)),
        );

        // The overlay goes in the title bar; only touch it when it changes.
        if preview.overlay != overlay {
            preview.overlay = overlay.to_string();
            let title = format!("{} | {}", preview.title, overlay);
            preview.window.set_title(&title);
        }

        preview
            .window
            .update_with_buffer(&preview.buffer, frame.width, frame.height)
            .map_err(|e| ControlError::Display(e.to_string()))?;

        if !preview.window.is_open() {
            debug!("Preview window closed");
            preview.pending.push_back(Command::Quit);
            return Ok(());
        }

        let keys = preview.window.get_keys_pressed(KeyRepeat::No);
        preview
            .pending
            .extend(keys.into_iter().filter_map(command_for_key));
        Ok(())
    }
}

/// Keys pressed in the preview window, in the order they arrived.
pub struct KeyboardCommands {
    window: Rc<RefCell<PreviewWindow>>,
}

impl CommandSource for KeyboardCommands {
    /// minifb only gathers input while the frame is presented, so the queue
    /// is already filled by the time this runs and `timeout` is not needed.
    fn poll_command(&mut self, _timeout: Duration) -> Option<Command> {
        self.window.borrow_mut().pending.pop_front()
    }
}

fn command_for_key(key: Key) -> Option<Command> {
    let c = match key {
        Key::Escape => return Some(Command::Quit),
        Key::Q => 'q',
        Key::T => 't',
        Key::W => 'w',
        Key::S => 's',
        Key::E => 'e',
        Key::D => 'd',
        Key::R => 'r',
        Key::F => 'f',
        Key::Y => 'y',
        Key::H => 'h',
        _ => return None,
    };
    Command::from_key(c)
}
