// Edit session: owns the surface for the current picture and the
// "payload + instruction -> edited picture" exchange with the model.
// Visual: while a request is out the editor shows a busy state; afterwards
// either the before/after comparison or an error with a retry option.

use crate::composite::EncodedImage;
use crate::config::Config;
use crate::error::{Error, InpaintError, Result};
use crate::surface::RasterSurface;
use crate::types::Image;

/// Anything that can fill the transparent region of a payload.
pub trait Inpainter: Send + Sync {
    fn inpaint(&self, payload: &EncodedImage, instruction: &str) -> Result<Image, InpaintError>;
}

/// Exactly what goes to the model: the punched-out image and the instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditRequest {
    pub payload: EncodedImage,
    pub instruction: String,
}

/// Identifies one submission, so a late answer for an abandoned request is dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

pub struct EditSession {
    surface: Option<RasterSurface>,
    edited: Option<Image>,
    last_request: Option<EditRequest>,
    in_flight: Option<Ticket>,
    next_ticket: u64,
    last_error: Option<String>,
    config: Config,
}

impl EditSession {
    pub fn new(config: &Config) -> Self {
        Self {
            surface: None,
            edited: None,
            last_request: None,
            in_flight: None,
            next_ticket: 0,
            last_error: None,
            config: config.clone(),
        }
    }

    /// Start editing a new picture. Result, error and the cached request are dropped.
    pub fn load_image(&mut self, image: Image) -> &mut RasterSurface {
        self.edited = None;
        self.last_error = None;
        self.last_request = None;
        self.in_flight = None;
        let surface = match self.surface.take() {
            Some(mut surface) => {
                surface.load_image(image);
                surface
            }
            None => RasterSurface::with_history_limit(image, self.config.history_limit),
        };
        self.surface.insert(surface)
    }

    /// Drop everything, picture included.
    pub fn reset(&mut self) {
        self.surface = None;
        self.edited = None;
        self.last_request = None;
        self.in_flight = None;
        self.last_error = None;
        tracing::info!("session reset");
    }

    pub fn current_image(&self) -> Option<&Image> {
        self.surface.as_ref().map(RasterSurface::image)
    }

    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut RasterSurface> {
        self.surface.as_mut()
    }

    pub fn edited_image(&self) -> Option<&Image> {
        self.edited.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// The request a retry would resend, if any.
    pub fn retry_request(&self) -> Option<&EditRequest> {
        self.last_request.as_ref()
    }

    pub fn can_retry(&self) -> bool {
        self.last_request.is_some() && !self.is_busy()
    }

    /// Build the payload from the current mask. A blank instruction becomes the default one.
    pub fn prepare(&self, instruction: &str) -> Result<EditRequest> {
        let surface = self.surface.as_ref().ok_or(Error::NoImage)?;
        let payload = EncodedImage::png(&surface.payload()?)?;
        Ok(EditRequest {
            payload,
            instruction: self.config.instruction_or_default(instruction),
        })
    }

    /// Mark `request` as in flight and remember it for retries.
    pub fn begin(&mut self, request: &EditRequest) -> Result<Ticket> {
        if self.is_busy() {
            return Err(Error::Busy);
        }
        if self.surface.is_none() {
            return Err(Error::NoImage);
        }
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.last_request = Some(request.clone());
        self.last_error = None;
        tracing::info!(
            ticket = ticket.0,
            bytes = request.payload.bytes().len(),
            instruction = %request.instruction,
            "edit request started"
        );
        Ok(ticket)
    }

    /// Record the collaborator's answer for `ticket`.
    /// Answers for a ticket that is no longer in flight are dropped and reported as `Ok(false)`.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<Image, InpaintError>,
    ) -> Result<bool> {
        if self.in_flight != Some(ticket) {
            tracing::debug!(ticket = ticket.0, "dropping stale edit result");
            return Ok(false);
        }
        self.in_flight = None;
        match outcome {
            Ok(image) => {
                tracing::info!(
                    ticket = ticket.0,
                    w = image.width(),
                    h = image.height(),
                    "edit finished"
                );
                self.edited = Some(image);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.0, error = %e, "edit failed");
                self.last_error = Some(e.to_string());
                Err(Error::Inpaint(e))
            }
        }
    }

    /// Paint-to-result in one blocking call.
    pub fn submit(&mut self, inpainter: &dyn Inpainter, instruction: &str) -> Result<&Image> {
        let request = self.prepare(instruction)?;
        self.run(inpainter, &request)
    }

    /// Resend the last request unchanged. No repainting needed.
    pub fn retry(&mut self, inpainter: &dyn Inpainter) -> Result<&Image> {
        let request = match &self.last_request {
            Some(r) => r.clone(),
            None => {
                self.last_error = Some(Error::NothingToRetry.to_string());
                return Err(Error::NothingToRetry);
            }
        };
        self.run(inpainter, &request)
    }

    fn run(&mut self, inpainter: &dyn Inpainter, request: &EditRequest) -> Result<&Image> {
        let ticket = self.begin(request)?;
        let outcome = inpainter.inpaint(&request.payload, &request.instruction);
        self.complete(ticket, outcome)?;
        self.edited.as_ref().ok_or(Error::NoImage)
    }
}
