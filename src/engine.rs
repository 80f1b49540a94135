use std::any::Any;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::error::{GlobeError, GlobeResult};
use crate::projection::Orthographic;
use crate::surface::Surface;

/// An init hook runs exactly once, before any draw hook. It may finish its
/// work after returning by holding on to the [`InitSignal`].
pub type InitHook = Box<dyn FnOnce(&mut GlobeState, InitSignal) -> anyhow::Result<()>>;

/// A draw hook runs on every draw pass, after initialization completes.
pub type DrawHook = Box<dyn FnMut(&mut GlobeState, &mut dyn Surface) -> anyhow::Result<()>>;

/// Single-fire completion token handed to every init hook. Firing consumes
/// the token; a hook that finishes synchronously completes it before
/// returning, an asynchronous one stores it and completes it later. The
/// engine refuses to run draw hooks until every token has fired.
pub struct InitSignal {
    fired: Rc<Cell<bool>>,
}

impl InitSignal {
    fn new() -> (Self, Rc<Cell<bool>>) {
        let fired = Rc::new(Cell::new(false));
        (
            Self {
                fired: Rc::clone(&fired),
            },
            fired,
        )
    }

    pub fn complete(self) {
        self.fired.set(true);
    }
}

/// Typed plugin namespace: each plugin exposes one state value under its own
/// name, recovered by any plugin or the caller via a checked downcast.
#[derive(Default)]
pub struct PluginRegistry {
    entries: HashMap<String, Box<dyn Any>>,
}

impl PluginRegistry {
    pub fn insert<T: Any>(&mut self, name: &str, value: T) {
        self.entries.insert(name.to_string(), Box::new(value));
    }

    pub fn get<T: Any>(&self, name: &str) -> Option<&T> {
        self.entries.get(name)?.downcast_ref::<T>()
    }

    pub fn get_mut<T: Any>(&mut self, name: &str) -> Option<&mut T> {
        self.entries.get_mut(name)?.downcast_mut::<T>()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn remove_entry(&mut self, name: &str) -> Option<Box<dyn Any>> {
        self.entries.remove(name)
    }

    fn restore_entry(&mut self, name: &str, entry: Box<dyn Any>) {
        self.entries.insert(name.to_string(), entry);
    }
}

/// The mutable state draw and gesture hooks operate on: projection
/// parameters, the plugin namespace, and the clock. Shared by plain `&mut` —
/// the engine is single-threaded and hooks never run concurrently.
pub struct GlobeState {
    pub projection: Orthographic,
    pub plugins: PluginRegistry,
    clock: Box<dyn Clock>,
}

impl GlobeState {
    /// Current clock reading; the timestamp source for all time-decayed
    /// visuals within one draw pass.
    pub fn now(&self) -> Duration {
        self.clock.now()
    }
}

enum Lifecycle {
    Registering,
    Pending(Vec<(String, Rc<Cell<bool>>)>),
    Ready,
}

/// What a call to [`Globe::draw`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    /// All draw hooks ran.
    Rendered,
    /// Initialization has not completed; the call was dropped, not queued.
    Pending,
}

/// A unit of behavior loaded into the globe. Plugins register hooks and
/// expose state through the narrow [`Setup`] handle; they never see the
/// engine's internals.
///
/// A plugin that reads another plugin's namespace entry in its *init* hook
/// must be loaded after that entry's producer. The engine preserves
/// registration order but does not check the dependency.
pub trait Plugin {
    fn name(&self) -> &'static str;
    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()>;
}

/// Capability handle passed to [`Plugin::configure`].
pub struct Setup<'a> {
    plugin: &'a str,
    init_hooks: &'a mut Vec<(String, InitHook)>,
    draw_hooks: &'a mut Vec<(String, DrawHook)>,
    state: &'a mut GlobeState,
}

impl Setup<'_> {
    pub fn plugin_name(&self) -> &str {
        self.plugin
    }

    /// Append to the init hook sequence under this plugin's name.
    pub fn on_init(
        &mut self,
        hook: impl FnOnce(&mut GlobeState, InitSignal) -> anyhow::Result<()> + 'static,
    ) {
        self.init_hooks
            .push((self.plugin.to_string(), Box::new(hook)));
    }

    /// Append to the draw hook sequence under this plugin's name.
    pub fn on_draw(
        &mut self,
        hook: impl FnMut(&mut GlobeState, &mut dyn Surface) -> anyhow::Result<()> + 'static,
    ) {
        self.draw_hooks
            .push((self.plugin.to_string(), Box::new(hook)));
    }

    /// Expose this plugin's state in the namespace under its own name.
    pub fn expose<T: Any>(&mut self, value: T) {
        self.state.plugins.insert(self.plugin, value);
    }

    pub fn state(&mut self) -> &mut GlobeState {
        self.state
    }

    /// Configure a sibling plugin under its own name. Composite plugins
    /// (e.g. `earth`) bundle their parts this way.
    pub fn load<P: Plugin>(&mut self, plugin: P) -> anyhow::Result<()> {
        let name = plugin.name();
        let mut nested = Setup {
            plugin: name,
            init_hooks: &mut *self.init_hooks,
            draw_hooks: &mut *self.draw_hooks,
            state: &mut *self.state,
        };
        plugin.configure(&mut nested)
    }
}

/// The composition root: owns the projection state, the plugin namespace,
/// the hook lists and the init-once / draw-every-frame lifecycle.
pub struct Globe {
    pub state: GlobeState,
    init_hooks: Vec<(String, InitHook)>,
    draw_hooks: Vec<(String, DrawHook)>,
    lifecycle: Lifecycle,
    diagnostics: Vec<GlobeError>,
}

impl Globe {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            state: GlobeState {
                projection: Orthographic::default(),
                plugins: PluginRegistry::default(),
                clock: Box::new(clock),
            },
            init_hooks: Vec::new(),
            draw_hooks: Vec::new(),
            lifecycle: Lifecycle::Registering,
            diagnostics: Vec::new(),
        }
    }

    /// Configure a plugin against this globe. Must happen before the first
    /// draw: a plugin loaded later would never get its init pass.
    pub fn load_plugin<P: Plugin>(&mut self, plugin: P) -> GlobeResult<()> {
        let name = plugin.name().to_string();
        if !matches!(self.lifecycle, Lifecycle::Registering) {
            return Err(GlobeError::init(
                name,
                anyhow::anyhow!("loaded after the init pass already started"),
            ));
        }
        let mut setup = Setup {
            plugin: &name,
            init_hooks: &mut self.init_hooks,
            draw_hooks: &mut self.draw_hooks,
            state: &mut self.state,
        };
        plugin
            .configure(&mut setup)
            .map_err(|source| GlobeError::init(name, source))
    }

    pub fn initialized(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Ready)
    }

    /// Draw hook failures recorded so far (newest last). The animation loop
    /// never stops over a bad layer; it is reported here and skipped for
    /// the pass.
    pub fn diagnostics(&self) -> &[GlobeError] {
        &self.diagnostics
    }

    /// Run one draw pass against the surface.
    ///
    /// The first call triggers the init pass; until every init hook has
    /// fired its completion signal, calls return [`DrawOutcome::Pending`]
    /// without rendering. Once initialized, every call runs all draw hooks
    /// in registration order.
    pub fn draw(&mut self, surface: &mut dyn Surface) -> GlobeResult<DrawOutcome> {
        if matches!(self.lifecycle, Lifecycle::Registering) {
            let failure = self.run_init_pass();
            if let Some(err) = failure {
                return Err(err);
            }
        }

        let ready = match &mut self.lifecycle {
            Lifecycle::Ready => true,
            Lifecycle::Pending(signals) => {
                // A signal dropped without firing can never complete; the
                // owning plugin failed to initialize. It leaves the barrier
                // so the rest of the globe can still come up.
                if let Some(pos) = signals
                    .iter()
                    .position(|(_, flag)| !flag.get() && Rc::strong_count(flag) == 1)
                {
                    let (plugin, _) = signals.remove(pos);
                    return Err(GlobeError::init(
                        plugin,
                        anyhow::anyhow!("completion signal dropped before firing"),
                    ));
                }
                signals.iter().all(|(_, flag)| flag.get())
            }
            Lifecycle::Registering => false,
        };

        if !ready {
            return Ok(DrawOutcome::Pending);
        }
        if !self.initialized() {
            tracing::debug!("globe initialized");
            self.lifecycle = Lifecycle::Ready;
        }

        for (plugin, hook) in &mut self.draw_hooks {
            if let Err(source) = hook(&mut self.state, surface) {
                tracing::warn!(plugin = plugin.as_str(), error = %source, "draw hook failed, skipped for this pass");
                self.diagnostics.push(GlobeError::DrawHook {
                    plugin: plugin.clone(),
                    source,
                });
            }
        }
        Ok(DrawOutcome::Rendered)
    }

    /// Run every registered init hook once, in registration order. A hook
    /// that fails is dropped from the completion barrier — fatal to that
    /// plugin, not to the globe. The first failure is returned after the
    /// whole pass; any further ones land in the diagnostics.
    fn run_init_pass(&mut self) -> Option<GlobeError> {
        let hooks = std::mem::take(&mut self.init_hooks);
        let mut signals = Vec::with_capacity(hooks.len());
        let mut failure = None;
        for (plugin, hook) in hooks {
            let (signal, flag) = InitSignal::new();
            match hook(&mut self.state, signal) {
                Ok(()) => signals.push((plugin, flag)),
                Err(source) => {
                    let err = GlobeError::init(plugin, source);
                    tracing::warn!(error = %err, "plugin init failed");
                    if failure.is_none() {
                        failure = Some(err);
                    } else {
                        self.diagnostics.push(err);
                    }
                }
            }
        }
        tracing::debug!(hooks = signals.len(), "init pass ran, awaiting completion signals");
        self.lifecycle = Lifecycle::Pending(signals);
        failure
    }

    /// Operate on one plugin's namespace entry together with the rest of the
    /// engine state. The entry is temporarily removed so the closure can
    /// reach both it and sibling plugins; it is reinserted afterwards, also
    /// on a failed downcast.
    ///
    /// Returns `None` if the entry is missing or of the wrong type.
    pub fn with_plugin<T: Any, R>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut T, &mut GlobeState) -> R,
    ) -> Option<R> {
        let mut entry = self.state.plugins.remove_entry(name)?;
        let result = entry
            .downcast_mut::<T>()
            .map(|value| f(value, &mut self.state));
        self.state.plugins.restore_entry(name, entry);
        result
    }
}

impl Default for Globe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braille::BrailleSurface;
    use crate::clock::ManualClock;

    struct CountingPlugin {
        draws: Rc<Cell<usize>>,
    }

    impl Plugin for CountingPlugin {
        fn name(&self) -> &'static str {
            "counting"
        }
        fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
            let draws = self.draws;
            setup.on_draw(move |_state, _surface| {
                draws.set(draws.get() + 1);
                Ok(())
            });
            Ok(())
        }
    }

    /// Holds its init signal until the test releases it, simulating a slow
    /// data load.
    struct SlowPlugin {
        parked: Rc<std::cell::RefCell<Option<InitSignal>>>,
    }

    impl Plugin for SlowPlugin {
        fn name(&self) -> &'static str {
            "slow"
        }
        fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
            let parked = self.parked;
            setup.on_init(move |_state, signal| {
                parked.borrow_mut().replace(signal);
                Ok(())
            });
            Ok(())
        }
    }

    fn surface() -> BrailleSurface {
        BrailleSurface::new(10, 5)
    }

    #[test]
    fn draws_are_dropped_until_init_completes() {
        let draws = Rc::new(Cell::new(0));
        let parked = Rc::new(std::cell::RefCell::new(None));
        let mut globe = Globe::with_clock(ManualClock::new());
        globe
            .load_plugin(SlowPlugin {
                parked: Rc::clone(&parked),
            })
            .unwrap();
        globe
            .load_plugin(CountingPlugin {
                draws: Rc::clone(&draws),
            })
            .unwrap();

        let mut surface = surface();
        for _ in 0..3 {
            assert_eq!(globe.draw(&mut surface).unwrap(), DrawOutcome::Pending);
        }
        assert_eq!(draws.get(), 0);
        assert!(!globe.initialized());

        parked.borrow_mut().take().unwrap().complete();
        assert_eq!(globe.draw(&mut surface).unwrap(), DrawOutcome::Rendered);
        assert_eq!(draws.get(), 1);
        assert!(globe.initialized());
    }

    #[test]
    fn synchronous_plugins_render_on_the_first_draw() {
        let draws = Rc::new(Cell::new(0));
        let mut globe = Globe::with_clock(ManualClock::new());
        globe
            .load_plugin(CountingPlugin {
                draws: Rc::clone(&draws),
            })
            .unwrap();
        assert_eq!(globe.draw(&mut surface()).unwrap(), DrawOutcome::Rendered);
        assert_eq!(draws.get(), 1);
    }

    #[test]
    fn draw_hooks_run_in_registration_order() {
        struct OrderPlugin {
            name: &'static str,
            order: Rc<std::cell::RefCell<Vec<&'static str>>>,
        }
        impl Plugin for OrderPlugin {
            fn name(&self) -> &'static str {
                self.name
            }
            fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
                let order = self.order;
                let name = self.name;
                setup.on_draw(move |_state, _surface| {
                    order.borrow_mut().push(name);
                    Ok(())
                });
                Ok(())
            }
        }

        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut globe = Globe::with_clock(ManualClock::new());
        for name in ["first", "second", "third"] {
            globe
                .load_plugin(OrderPlugin {
                    name,
                    order: Rc::clone(&order),
                })
                .unwrap();
        }
        globe.draw(&mut surface()).unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn failing_draw_hook_does_not_stop_the_pass() {
        struct FailingPlugin;
        impl Plugin for FailingPlugin {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
                setup.on_draw(|_state, _surface| anyhow::bail!("bad layer"));
                Ok(())
            }
        }

        let draws = Rc::new(Cell::new(0));
        let mut globe = Globe::with_clock(ManualClock::new());
        globe.load_plugin(FailingPlugin).unwrap();
        globe
            .load_plugin(CountingPlugin {
                draws: Rc::clone(&draws),
            })
            .unwrap();

        let mut surface = surface();
        for _ in 0..5 {
            assert_eq!(globe.draw(&mut surface).unwrap(), DrawOutcome::Rendered);
        }
        assert_eq!(draws.get(), 5);
        assert_eq!(globe.diagnostics().len(), 5);
        assert!(globe
            .diagnostics()
            .iter()
            .all(|err| matches!(err, GlobeError::DrawHook { plugin, .. } if plugin == "failing")));
    }

    #[test]
    fn failing_init_hook_names_the_plugin_and_spares_the_rest() {
        struct BrokenInit;
        impl Plugin for BrokenInit {
            fn name(&self) -> &'static str {
                "broken"
            }
            fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
                setup.on_init(|_state, _signal| anyhow::bail!("no data"));
                Ok(())
            }
        }

        let draws = Rc::new(Cell::new(0));
        let mut globe = Globe::with_clock(ManualClock::new());
        globe.load_plugin(BrokenInit).unwrap();
        globe
            .load_plugin(CountingPlugin {
                draws: Rc::clone(&draws),
            })
            .unwrap();

        let mut surface = surface();
        let err = globe.draw(&mut surface).unwrap_err();
        assert!(matches!(err, GlobeError::Init { plugin, .. } if plugin == "broken"));

        // The globe itself still comes up on the next pass.
        assert_eq!(globe.draw(&mut surface).unwrap(), DrawOutcome::Rendered);
        assert_eq!(draws.get(), 1);
    }

    #[test]
    fn dropped_init_signal_is_an_init_error() {
        struct ForgetfulPlugin;
        impl Plugin for ForgetfulPlugin {
            fn name(&self) -> &'static str {
                "forgetful"
            }
            fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
                // Returns Ok but lets the signal fall on the floor.
                setup.on_init(|_state, _signal| Ok(()));
                Ok(())
            }
        }

        let mut globe = Globe::with_clock(ManualClock::new());
        globe.load_plugin(ForgetfulPlugin).unwrap();
        let err = globe.draw(&mut surface()).unwrap_err();
        assert!(matches!(err, GlobeError::Init { plugin, .. } if plugin == "forgetful"));
        // Barrier is clear afterwards; the globe still renders.
        assert_eq!(globe.draw(&mut surface()).unwrap(), DrawOutcome::Rendered);
    }

    #[test]
    fn loading_after_first_draw_fails() {
        let mut globe = Globe::with_clock(ManualClock::new());
        globe.draw(&mut surface()).unwrap();
        let draws = Rc::new(Cell::new(0));
        let err = globe.load_plugin(CountingPlugin { draws }).unwrap_err();
        assert!(matches!(err, GlobeError::Init { plugin, .. } if plugin == "counting"));
    }

    #[test]
    fn namespace_roundtrip_and_checked_downcast() {
        struct ExposingPlugin;
        impl Plugin for ExposingPlugin {
            fn name(&self) -> &'static str {
                "exposing"
            }
            fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
                setup.expose(41usize);
                Ok(())
            }
        }

        let mut globe = Globe::with_clock(ManualClock::new());
        globe.load_plugin(ExposingPlugin).unwrap();
        assert_eq!(globe.state.plugins.get::<usize>("exposing"), Some(&41));
        assert_eq!(globe.state.plugins.get::<String>("exposing"), None);

        let bumped = globe.with_plugin::<usize, _>("exposing", |value, _state| {
            *value += 1;
            *value
        });
        assert_eq!(bumped, Some(42));

        // Wrong type: closure does not run, entry survives.
        assert_eq!(
            globe.with_plugin::<String, _>("exposing", |_, _| unreachable!()),
            None
        );
        assert_eq!(globe.state.plugins.get::<usize>("exposing"), Some(&42));
    }

    #[test]
    fn exactly_one_init_pass() {
        let inits = Rc::new(Cell::new(0));
        struct InitCounter {
            inits: Rc<Cell<usize>>,
        }
        impl Plugin for InitCounter {
            fn name(&self) -> &'static str {
                "init-counter"
            }
            fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
                let inits = self.inits;
                setup.on_init(move |_state, signal| {
                    inits.set(inits.get() + 1);
                    signal.complete();
                    Ok(())
                });
                Ok(())
            }
        }

        let mut globe = Globe::with_clock(ManualClock::new());
        globe
            .load_plugin(InitCounter {
                inits: Rc::clone(&inits),
            })
            .unwrap();
        let mut surface = surface();
        for _ in 0..4 {
            globe.draw(&mut surface).unwrap();
        }
        assert_eq!(inits.get(), 1);
    }
}
