//! Shared test utilities used across distred crates.

pub mod tracing {
    //! Recording layer for asserting on spans and events in tests.
    use std::collections::HashMap;
    use std::fmt;
    use std::sync::{Arc, Mutex, MutexGuard};

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::registry::{LookupSpan, Registry};

    /// Layer that keeps every closed span and emitted event in memory.
    ///
    /// Clones share the same buffers, so a test can hand one clone to a
    /// subscriber and inspect the other afterwards.
    #[derive(Clone, Default)]
    pub struct RecordingLayer {
        spans: Arc<Mutex<Vec<SpanRecord>>>,
        events: Arc<Mutex<Vec<EventRecord>>>,
    }

    impl RecordingLayer {
        /// Closed spans in completion order.
        ///
        /// # Examples
        /// ```
        /// use distred_test_support::tracing::RecordingLayer;
        ///
        /// let layer = RecordingLayer::default();
        /// assert!(layer.spans().is_empty());
        /// ```
        #[must_use]
        pub fn spans(&self) -> Vec<SpanRecord> {
            lock(&self.spans).clone()
        }

        /// Events in emission order.
        ///
        /// # Examples
        /// ```
        /// use distred_test_support::tracing::RecordingLayer;
        ///
        /// let layer = RecordingLayer::default();
        /// assert!(layer.events().is_empty());
        /// ```
        #[must_use]
        pub fn events(&self) -> Vec<EventRecord> {
            lock(&self.events).clone()
        }

        /// First closed span called `name`, if any.
        #[must_use]
        pub fn span_named(&self, name: &str) -> Option<SpanRecord> {
            lock(&self.spans)
                .iter()
                .find(|span| span.name == name)
                .cloned()
        }

        /// Values recorded for `field` across all events, in emission order.
        #[must_use]
        pub fn event_values(&self, field: &str) -> Vec<String> {
            lock(&self.events)
                .iter()
                .filter_map(|event| event.fields.get(field).cloned())
                .collect()
        }
    }

    /// Runs `action` with a fresh [`RecordingLayer`] installed as the
    /// thread-default subscriber and returns both.
    ///
    /// # Examples
    /// ```
    /// use distred_test_support::tracing::capture;
    ///
    /// let (value, layer) = capture(|| {
    ///     tracing::info!(answer = 42, "computed");
    ///     7
    /// });
    /// assert_eq!(value, 7);
    /// assert_eq!(layer.event_values("answer"), ["42"]);
    /// ```
    pub fn capture<T>(action: impl FnOnce() -> T) -> (T, RecordingLayer) {
        let layer = RecordingLayer::default();
        let subscriber = Registry::default().with(layer.clone());
        let value = tracing::subscriber::with_default(subscriber, action);
        (value, layer)
    }

    fn lock<T>(buffer: &Mutex<T>) -> MutexGuard<'_, T> {
        buffer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Name and fields of a closed span.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SpanRecord {
        /// Span name from the callsite metadata.
        pub name: String,
        /// Fields recorded at creation or later via `Span::record`.
        pub fields: HashMap<String, String>,
    }

    impl SpanRecord {
        /// Value recorded for `field`, if any.
        #[must_use]
        pub fn field(&self, field: &str) -> Option<&str> {
            self.fields.get(field).map(String::as_str)
        }
    }

    /// Level, target and fields of an emitted event.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EventRecord {
        /// Event level.
        pub level: Level,
        /// Event target, usually the emitting module path.
        pub target: String,
        /// Event fields, including `message`.
        pub fields: HashMap<String, String>,
    }

    struct OpenSpan {
        name: String,
        fields: HashMap<String, String>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'span> LookupSpan<'span>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            id: &tracing::span::Id,
            ctx: Context<'_, S>,
        ) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            let mut open = OpenSpan {
                name: attrs.metadata().name().to_owned(),
                fields: HashMap::new(),
            };
            attrs.record(&mut FieldCollector(&mut open.fields));
            span.extensions_mut().insert(open);
        }

        fn on_record(
            &self,
            id: &tracing::span::Id,
            values: &tracing::span::Record<'_>,
            ctx: Context<'_, S>,
        ) {
            let Some(span) = ctx.span(id) else {
                return;
            };
            if let Some(open) = span.extensions_mut().get_mut::<OpenSpan>() {
                values.record(&mut FieldCollector(&mut open.fields));
            }
        }

        fn on_close(&self, id: tracing::span::Id, ctx: Context<'_, S>) {
            let Some(span) = ctx.span(&id) else {
                return;
            };
            let Some(open) = span.extensions_mut().remove::<OpenSpan>() else {
                return;
            };
            lock(&self.spans).push(SpanRecord {
                name: open.name,
                fields: open.fields,
            });
        }

        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = HashMap::new();
            event.record(&mut FieldCollector(&mut fields));
            lock(&self.events).push(EventRecord {
                level: *event.metadata().level(),
                target: event.metadata().target().to_owned(),
                fields,
            });
        }
    }

    struct FieldCollector<'a>(&'a mut HashMap<String, String>);

    impl FieldCollector<'_> {
        fn put(&mut self, field: &Field, value: String) {
            self.0.insert(field.name().to_owned(), value);
        }
    }

    impl Visit for FieldCollector<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.put(field, format!("{value:?}"));
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            self.put(field, value.to_owned());
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.put(field, value.to_string());
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.put(field, value.to_string());
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.put(field, value.to_string());
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.put(field, value.to_string());
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.put(field, value.to_string());
        }
    }
}

pub mod fixtures {
    //! Deterministic vector fixtures.

    /// Builds two deterministic vectors of `len` elements whose element-wise
    /// differences vary in sign and magnitude.
    ///
    /// # Examples
    /// ```
    /// use distred_test_support::fixtures::ramp_pair;
    ///
    /// let (left, right) = ramp_pair(3);
    /// assert_eq!(left, [0.0, 0.25, 0.5]);
    /// assert_eq!(right, [1.5, 1.0, 0.5]);
    /// ```
    #[must_use]
    pub fn ramp_pair(len: usize) -> (Vec<f64>, Vec<f64>) {
        let left = (0..len).map(|i| index_to_f64(i) * 0.25).collect();
        let right = (0..len).map(|i| index_to_f64(len - i) * 0.5).collect();
        (left, right)
    }

    fn index_to_f64(index: usize) -> f64 {
        u32::try_from(index).map_or(f64::from(u32::MAX), f64::from)
    }
}

pub mod ci;
