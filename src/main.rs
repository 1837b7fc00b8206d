// What you SEE:
// • The picture, scaled to fit the window, with your mask painted in translucent pink.
// • Hold Left Mouse: paint the area the model should regenerate. A circle shows the brush.
// • [ and ] change the brush size. Z undo, Y redo, C clear the mask.
// • Enter sends the masked picture and your instruction (HUD shows WORKING).
// • Result view: Left/Right or dragging moves the before/after slider.
//   S saves, R retries, E goes back to the mask, N starts over with the same picture.
// • D dismisses an error. ESC quits.

mod draw;

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use draw::{Drawer, draw_circle, draw_text_5x7, shade_rows};
use inpaint_brush::gamma::GammaLut;
use inpaint_brush::gemini::GeminiInpainter;
use inpaint_brush::view::{self, FrameBuffer, Overlay};
use inpaint_brush::{
    Config, EditRequest, EditSession, Error, Image, InpaintError, Inpainter, Ticket, files,
};
use kurbo::Size;
use tracing_subscriber::EnvFilter;

type Outcome = (Ticket, Result<Image, InpaintError>);

#[derive(Parser, Debug)]
#[command(name = "inpaint-brush", version, about = "Paint a mask, let an image model fill it")]
struct Cli {
    /// Picture to edit (PNG, JPEG, WebP, ...).
    image: PathBuf,

    /// Instruction for the model. Empty uses the configured default.
    #[arg(long, default_value = "")]
    prompt: String,

    /// Optional JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where S saves the edited picture.
    #[arg(long, default_value = files::DEFAULT_EXPORT_NAME)]
    out: PathBuf,
}

/// Hand `request` to a worker thread. The answer comes back through `tx`.
fn dispatch(
    session: &mut EditSession,
    request: EditRequest,
    inpainter: &Arc<dyn Inpainter>,
    tx: &Sender<Outcome>,
) -> Result<(), Error> {
    let ticket = session.begin(&request)?;
    let worker = Arc::clone(inpainter);
    let tx = tx.clone();
    thread::spawn(move || {
        let outcome = worker.inpaint(&request.payload, &request.instruction);
        // The receiver is gone only when the window already closed.
        let _ = tx.send((ticket, outcome));
    });
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    /* --- Picture + session ---
       Visual: nothing yet, the picture is decoded at full resolution. */
    let original = files::load_image(&cli.image)
        .with_context(|| format!("opening {}", cli.image.display()))?;
    let mut session = EditSession::new(&cfg);
    session.load_image(original.clone());

    /* --- Window sized to the picture ---
       Visual: window opens showing the picture, shrunk if it is larger than the screen budget. */
    let (w, h) = view::fit_within(
        original.width(),
        original.height(),
        cfg.max_window_width,
        cfg.max_window_height,
    );
    let mut drawer = Drawer::new("Inpaint Brush", w, h)?;
    let mut screen = FrameBuffer::new(w, h);
    let display = Size::new(w as f64, h as f64);
    let lut = GammaLut::new();
    let overlay = Overlay {
        color: cfg.stroke_color,
        opacity: cfg.overlay_opacity,
    };

    /* --- Model worker ---
       Visual: requests run off the UI thread, so the window stays responsive while WORKING. */
    let inpainter: Arc<dyn Inpainter> = Arc::new(GeminiInpainter::from_env(Duration::from_secs(
        cfg.request_timeout_secs,
    ))?);
    let (tx, rx) = mpsc::channel::<Outcome>();

    let mut brush = cfg.brush.clamp(cfg.brush.size);
    let mut was_down = false; // press edge starts a stroke
    let mut show_result = false;
    let mut slider: f32 = 50.0;
    let mut notice: Option<String> = None;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Collect finished requests.
           Visual: WORKING disappears; the comparison or an error shows up. */
        while let Ok((ticket, outcome)) = rx.try_recv() {
            match session.complete(ticket, outcome) {
                Ok(true) => {
                    show_result = true;
                    slider = 50.0;
                    notice = None;
                }
                Ok(false) => {}
                Err(e) => tracing::debug!(error = %e, "edit failed"),
            }
        }

        /* 2) Inputs */
        if drawer.dismiss_pressed() {
            session.dismiss_error(); // visual: error line goes away
        }
        if drawer.retry_pressed() && session.can_retry() {
            // visual: same payload and instruction go out again, no repainting
            if let Some(request) = session.retry_request().cloned() {
                if let Err(e) = dispatch(&mut session, request, &inpainter, &tx) {
                    tracing::warn!(error = %e, "retry refused");
                }
            }
        }

        let busy = session.is_busy();
        let down = drawer.left_mouse_down();
        let comparing = show_result && session.edited_image().is_some();

        if comparing {
            if drawer.slider_left() {
                slider = (slider - 5.0).max(0.0);
            }
            if drawer.slider_right() {
                slider = (slider + 5.0).min(100.0);
            }
            if down {
                if let Some(p) = drawer.mouse_pos() {
                    slider = (p.x / display.width * 100.0).clamp(0.0, 100.0) as f32;
                }
            }
            if drawer.save_pressed() {
                if let Some(edited) = session.edited_image() {
                    notice = Some(match files::save_png(edited, &cli.out) {
                        Ok(()) => format!("SAVED {}", cli.out.display()),
                        Err(e) => {
                            tracing::warn!(error = %e, "save failed");
                            "SAVE FAILED".to_string()
                        }
                    });
                }
            }
            if drawer.edit_pressed() {
                show_result = false; // visual: back to the mask, strokes intact
            }
            if drawer.new_pressed() && !busy {
                session.load_image(original.clone()); // visual: fresh picture, empty mask
                show_result = false;
                notice = None;
            }
        } else if !busy {
            if drawer.shrink_brush() {
                brush = cfg.brush.clamp(brush - cfg.brush.step);
            }
            if drawer.grow_brush() {
                brush = cfg.brush.clamp(brush + cfg.brush.step);
            }

            if let Some(surface) = session.surface_mut() {
                if drawer.undo_pressed() {
                    surface.undo(); // visual: last stroke vanishes
                }
                if drawer.redo_pressed() {
                    surface.redo(); // visual: it comes back
                }
                if drawer.clear_pressed() {
                    surface.clear();
                }

                // Paint while holding left mouse. Leaving the window ends the stroke.
                let mapping = surface.display_mapping(display);
                match drawer.mouse_pos() {
                    Some(p) if down => {
                        let at = mapping.to_image(p);
                        if was_down {
                            surface.extend_stroke(at); // visual: pink line follows the cursor
                        } else {
                            surface.begin_stroke(at, brush);
                        }
                    }
                    _ => {
                        surface.end_stroke();
                    }
                }
            }

            if drawer.submit_pressed() {
                let sent = session
                    .prepare(&cli.prompt)
                    .and_then(|request| dispatch(&mut session, request, &inpainter, &tx));
                if let Err(e) = sent {
                    tracing::warn!(error = %e, "could not send edit");
                }
            }
        }

        /* 3) Base image for this frame. */
        match (comparing, session.edited_image(), session.surface()) {
            (true, Some(edited), Some(surface)) => {
                // Visual: edited picture left of the slider, original on the right.
                view::render_compare(&mut screen, surface.image(), edited, slider, &lut);
            }
            (_, _, Some(surface)) => {
                view::render_editor(&mut screen, surface, overlay, &lut);
                if let Some(p) = drawer.mouse_pos() {
                    let mapping = surface.display_mapping(display);
                    let radius = (brush / 2.0 / mapping.scale_x()).round() as i32;
                    draw_circle(&mut screen, p.x as i32, p.y as i32, radius, 0x00_FF_FF_FF);
                }
            }
            _ => screen.pixels.fill(0),
        }

        /* 4) HUD text */
        let mut lines: Vec<String> = Vec::new();
        if busy {
            lines.push("WORKING...".to_string());
        } else if comparing {
            lines.push(format!(
                "< > SLIDER {slider:.0}% | S SAVE  R RETRY  E EDIT  N NEW"
            ));
        } else if let Some(surface) = session.surface() {
            let undo = if surface.can_undo() { "Z UNDO" } else { "Z ----" };
            let redo = if surface.can_redo() { "Y REDO" } else { "Y ----" };
            lines.push(format!(
                "BRUSH {brush:.0} [ ] | {undo}  {redo}  C CLEAR | ENTER SEND"
            ));
        }
        if let Some(err) = session.last_error() {
            lines.push(format!("ERROR: {err}"));
            let retry = if session.can_retry() { "  R RETRY" } else { "" };
            lines.push(format!("D DISMISS{retry}"));
        }
        if let Some(n) = &notice {
            lines.push(n.clone());
        }
        shade_rows(&mut screen, 0, 8 + lines.len() * 10);
        for (i, line) in lines.iter().enumerate() {
            draw_text_5x7(&mut screen, 8, 6 + i as i32 * 10, line, 0x00_FF_FF_FF);
        }

        /* 5) Present to the window. */
        drawer.present(&screen)?;
        was_down = down;
    }

    Ok(())
}
