//! `HTMLAudioElement` transport

use js_sys::{Function, Promise, Reflect};
use lyra_core::SourceHandle;
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Blob, HtmlAudioElement, Url};

use crate::error::{PlaybackError, Result};
use crate::transport::{LoadTicket, SourceLease, Transport, TransportEvent};

/// Imported files, keyed by the value of [`SourceHandle::Blob`]
pub type BlobCache = Rc<RefCell<HashMap<String, Blob>>>;

type EventQueue = Rc<RefCell<VecDeque<TransportEvent>>>;
type Notifier = Rc<RefCell<Option<Function>>>;

/// Transport over a single audio element
///
/// Element events are queued; the owner drains them with
/// [`HtmlAudioTransport::take_events`]. An optional notifier is called
/// whenever something was queued so the page can schedule a drain.
pub struct HtmlAudioTransport {
    audio: HtmlAudioElement,
    blobs: BlobCache,
    source: Option<SourceLease<String>>,
    pending: Rc<Cell<Option<LoadTicket>>>,
    events: EventQueue,
    notifier: Notifier,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

impl HtmlAudioTransport {
    /// Create a detached audio element and hook its events
    pub fn new(blobs: BlobCache) -> std::result::Result<Self, JsValue> {
        let audio = HtmlAudioElement::new()?;
        audio.set_preload("auto");

        let mut transport = Self {
            audio,
            blobs,
            source: None,
            pending: Rc::new(Cell::new(None)),
            events: Rc::new(RefCell::new(VecDeque::new())),
            notifier: Rc::new(RefCell::new(None)),
            listeners: Vec::new(),
        };
        transport.hook_events()?;
        Ok(transport)
    }

    /// Set the callback run after events were queued
    pub fn set_notifier(&self, notifier: Option<Function>) {
        *self.notifier.borrow_mut() = notifier;
    }

    /// Take every queued event, oldest first
    pub fn take_events(&self) -> Vec<TransportEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    fn hook_events(&mut self) -> std::result::Result<(), JsValue> {
        let canplay = {
            let pending = Rc::clone(&self.pending);
            self.emitter(move |_| pending.take().map(|ticket| TransportEvent::Loaded { ticket }))
        };

        let error = {
            let pending = Rc::clone(&self.pending);
            self.emitter(move |audio| {
                let message = audio.error().map_or_else(
                    || "media element error".to_string(),
                    |e| format!("media error code {}", e.code()),
                );
                Some(match pending.take() {
                    Some(ticket) => TransportEvent::LoadFailed { ticket, message },
                    None => TransportEvent::Error { message },
                })
            })
        };

        let timeupdate = self.emitter(|audio| {
            Some(TransportEvent::TimeUpdate {
                time_secs: audio.current_time(),
            })
        });

        let ended = self.emitter(|_| Some(TransportEvent::Ended));

        for (name, closure) in [
            ("canplay", canplay),
            ("error", error),
            ("timeupdate", timeupdate),
            ("ended", ended),
        ] {
            self.audio
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            self.listeners.push((name, closure));
        }
        Ok(())
    }

    fn emitter(
        &self,
        mut make: impl FnMut(&HtmlAudioElement) -> Option<TransportEvent> + 'static,
    ) -> Closure<dyn FnMut()> {
        let audio = self.audio.clone();
        let events = Rc::clone(&self.events);
        let notifier = Rc::clone(&self.notifier);

        Closure::<dyn FnMut()>::new(move || {
            if let Some(event) = make(&audio) {
                queue_event(&events, &notifier, event);
            }
        })
    }

    // Rejections never reach the element's `error` listener
    fn watch_play(&self, promise: Promise) {
        let events = Rc::clone(&self.events);
        let notifier = Rc::clone(&self.notifier);

        spawn_local(async move {
            if let Err(reason) = JsFuture::from(promise).await {
                let name = string_field(&reason, "name");
                let message = string_field(&reason, "message");
                if let Some(event) =
                    TransportEvent::play_rejected(name.as_deref(), message.as_deref())
                {
                    queue_event(&events, &notifier, event);
                }
            }
        });
    }

    fn lease_for(&self, source: &SourceHandle) -> Result<SourceLease<String>> {
        match source {
            SourceHandle::Path(path) => Ok(SourceLease::unmanaged(
                path.to_string_lossy().into_owned(),
            )),
            SourceHandle::Url(url) => Ok(SourceLease::unmanaged(url.clone())),
            SourceHandle::Blob(key) => {
                let blob = self
                    .blobs
                    .borrow()
                    .get(key)
                    .cloned()
                    .ok_or_else(|| PlaybackError::transport(format!("no file registered for {key}")))?;
                let url = Url::create_object_url_with_blob(&blob)
                    .map_err(|e| PlaybackError::transport(format!("{e:?}")))?;
                Ok(SourceLease::new(url, |url| {
                    let _ = Url::revoke_object_url(url);
                }))
            }
        }
    }
}

impl Transport for HtmlAudioTransport {
    fn load(&mut self, source: &SourceHandle, ticket: LoadTicket) -> Result<()> {
        // Revoke the previous object URL before minting the next one
        self.source = None;

        let lease = self.lease_for(source)?;
        self.pending.set(Some(ticket));
        self.audio.set_src(lease.resource());
        self.audio.load();
        self.source = Some(lease);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let promise = self
            .audio
            .play()
            .map_err(|e| PlaybackError::transport(format!("{e:?}")))?;
        self.watch_play(promise);
        Ok(())
    }

    fn pause(&mut self) {
        let _ = self.audio.pause();
    }

    fn stop(&mut self) {
        let _ = self.audio.pause();
        self.audio.set_current_time(0.0);
    }

    fn seek(&mut self, time_secs: f64) {
        self.audio.set_current_time(time_secs);
    }

    fn set_volume(&mut self, volume: f64) {
        self.audio.set_volume(volume.clamp(0.0, 1.0));
    }

    fn set_muted(&mut self, muted: bool) {
        self.audio.set_muted(muted);
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.audio.duration();
        duration.is_finite().then_some(duration)
    }

    fn release(&mut self) {
        self.pending.set(None);
        let _ = self.audio.pause();
        let _ = self.audio.remove_attribute("src");
        self.audio.load();
        self.source = None;
    }
}

fn queue_event(events: &EventQueue, notifier: &Notifier, event: TransportEvent) {
    events.borrow_mut().push_back(event);
    if let Some(notify) = notifier.borrow().as_ref() {
        let _ = notify.call0(&JsValue::NULL);
    }
}

fn string_field(value: &JsValue, field: &str) -> Option<String> {
    Reflect::get(value, &JsValue::from_str(field))
        .ok()
        .and_then(|v| v.as_string())
}

impl Drop for HtmlAudioTransport {
    fn drop(&mut self) {
        for (name, closure) in &self.listeners {
            let _ = self
                .audio
                .remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
        }
        let _ = self.audio.pause();
    }
}
