//! `MediaElement` over a browser `HTMLMediaElement`

use std::cell::Cell;
use std::rc::Rc;

use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{DomException, HtmlMediaElement};

use crate::element::MediaElement;
use crate::signal::{MediaErrorKind, MediaSignal, PlayRejection, PlayRequest, SignalSender, SourceId};

/// Browser media element
///
/// Native events are forwarded as signals tagged with the source attached
/// when the event fires. Play promises are awaited on the event loop and
/// reported as `PlayResolved`/`PlayRejected`.
pub struct WebMediaElement {
    element: HtmlMediaElement,
    source: Rc<Cell<Option<SourceId>>>,
    sender: Option<SignalSender>,
    listeners: Vec<(&'static str, Closure<dyn FnMut()>)>,
}

impl WebMediaElement {
    /// Wrap an `<audio>` or `<video>` element
    pub fn new(element: HtmlMediaElement) -> Self {
        Self {
            element,
            source: Rc::new(Cell::new(None)),
            sender: None,
            listeners: Vec::new(),
        }
    }

    fn listen<F>(&mut self, event: &'static str, signals: &SignalSender, make: F)
    where
        F: Fn(&HtmlMediaElement, SourceId) -> MediaSignal + 'static,
    {
        let element = self.element.clone();
        let source = Rc::clone(&self.source);
        let signals = signals.clone();

        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(id) = source.get() {
                signals.send(make(&element, id));
            }
        });

        if let Err(e) = self
            .element
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            warn!(event, error = ?e, "Failed to subscribe to media event");
            return;
        }
        self.listeners.push((event, closure));
    }

    fn remove_listeners(&mut self) {
        for (event, closure) in self.listeners.drain(..) {
            let _ = self
                .element
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }

    fn reject(&self, request: PlayRequest, error: &JsValue) {
        let name = error
            .dyn_ref::<DomException>()
            .map(DomException::name)
            .unwrap_or_default();
        if let Some(signals) = &self.sender {
            signals.send(MediaSignal::PlayRejected {
                request,
                rejection: PlayRejection::from_dom_name(&name),
            });
        }
    }
}

impl MediaElement for WebMediaElement {
    fn attach(&mut self, signals: SignalSender) {
        self.remove_listeners();

        self.listen("loadeddata", &signals, |el, source| MediaSignal::LoadedData {
            source,
            duration: el.duration(),
        });
        self.listen("durationchange", &signals, |el, source| {
            MediaSignal::DurationChange {
                source,
                duration: el.duration(),
            }
        });
        self.listen("timeupdate", &signals, |el, source| MediaSignal::TimeUpdate {
            source,
            current_time: el.current_time(),
        });
        self.listen("seeked", &signals, |el, source| MediaSignal::Seeked {
            source,
            current_time: el.current_time(),
        });
        self.listen("ended", &signals, |_, source| MediaSignal::Ended { source });
        self.listen("error", &signals, |el, source| MediaSignal::Error {
            source,
            kind: el
                .error()
                .map(|e| MediaErrorKind::from_code(e.code()))
                .unwrap_or_else(|| MediaErrorKind::Unknown("no MediaError".to_string())),
        });

        self.sender = Some(signals);
    }

    fn detach(&mut self) {
        self.remove_listeners();
        self.sender = None;
    }

    fn set_source(&mut self, source: SourceId, url: &str) {
        self.source.set(Some(source));
        self.element.set_src(url);
    }

    fn clear_source(&mut self) {
        self.source.set(None);
        let _ = self.element.remove_attribute("src");
        // Abort the fetch and release buffered media
        self.element.load();
    }

    fn request_play(&mut self, request: PlayRequest) {
        let promise = match self.element.play() {
            Ok(promise) => promise,
            Err(e) => {
                self.reject(request, &e);
                return;
            }
        };

        let Some(signals) = self.sender.clone() else {
            return;
        };

        spawn_local(async move {
            let signal = match JsFuture::from(promise).await {
                Ok(_) => MediaSignal::PlayResolved { request },
                Err(e) => {
                    let name = e
                        .dyn_ref::<DomException>()
                        .map(DomException::name)
                        .unwrap_or_default();
                    MediaSignal::PlayRejected {
                        request,
                        rejection: PlayRejection::from_dom_name(&name),
                    }
                }
            };
            signals.send(signal);
        });
    }

    fn pause(&mut self) {
        let _ = self.element.pause();
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn set_volume(&mut self, gain: f64) {
        self.element.set_volume(gain.clamp(0.0, 1.0));
    }
}

impl Drop for WebMediaElement {
    fn drop(&mut self) {
        self.remove_listeners();
    }
}
