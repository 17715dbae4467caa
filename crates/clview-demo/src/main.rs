use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use clview_engine::input::{Action, KeyCode, KeyEvent, Modifiers, MouseButton, MouseListener};
use clview_engine::logging::{init_logging, LoggingConfig};
use clview_engine::{ClWindow, KernelArg, WindowConfig};

const KERNEL: &str = include_str!("../kernels/gradient.cl");

const TIME_ARG: u32 = 2;
const CURSOR_ARG: u32 = 3;

/// Tracks the cursor for the kernel. Holding the left button freezes it.
struct Cursor {
    position: Rc<Cell<[f32; 2]>>,
    held: bool,
}

impl MouseListener for Cursor {
    fn on_mouse_button(&mut self, button: MouseButton, action: Action, _modifiers: Modifiers) {
        if button == MouseButton::Left {
            self.held = action != Action::Released;
        }
    }

    fn on_mouse_cursor(&mut self, x: f64, y: f64) {
        if !self.held {
            self.position.set([x as f32, y as f32]);
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default().with_filter("info,clview_engine=debug"));

    let mut window = ClWindow::new(WindowConfig::default().with_title("clview gradient"))
        .context("failed to open OpenCL/OpenGL window")?;

    window
        .set_program_code(KERNEL, "-cl-fast-relaxed-math")
        .context("failed to build gradient kernel")?;

    let quit = Rc::new(Cell::new(false));
    let q = quit.clone();
    window.set_key_listener(move |event: &KeyEvent| {
        if event.code() == Some(KeyCode::Escape) && event.action == Action::Pressed {
            q.set(true);
        }
    });

    let cursor = Rc::new(Cell::new([0.0f32; 2]));
    window.set_mouse_listener(Cursor { position: cursor.clone(), held: false });

    let start = Instant::now();
    let bind = |window: &ClWindow| -> Result<()> {
        let time = start.elapsed().as_secs_f32();
        let position = cursor.get();
        window.set_kernel_arg(TIME_ARG, KernelArg::value(&time))?;
        window.set_kernel_arg(CURSOR_ARG, KernelArg::value(&position))?;
        Ok(())
    };

    bind(&window)?;
    let code = window.show().context("failed to show window")?;
    if !code.is_ok() {
        log::warn!("first frame: {code}");
    }

    let mut frames = 0u64;
    while !window.should_close() && !quit.get() {
        bind(&window)?;

        let code = window.render().context("render failed")?;
        if !code.is_ok() {
            log::warn!("frame {frames}: {code}");
        }
        window.swap_buffer().context("present failed")?;
        frames += 1;
    }

    log::info!(
        "{frames} frames in {:.1}s",
        start.elapsed().as_secs_f64()
    );
    window.destroy();
    Ok(())
}
