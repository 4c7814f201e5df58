use core::any::type_name;
use core::fmt::Debug;

extern crate alloc;
use alloc::rc::Rc;

use log::{log, Level};
use yewdux::prelude::{Dispatch as StoreDispatch, Reducer, Store};

use crate::dto::ApiRequest;

pub use self::dispatch::Dispatch;

/// A step in front of a [`Dispatch`]: it sees the message first and decides
/// what, if anything, reaches `next`.
pub trait Middleware<M, D>
where
    D: Dispatch<M>,
{
    fn invoke(&self, msg: M, next: D);
}

/// Messages which, besides reducing their own store, make a request to the backend.
///
/// The request is computed from the store as it was *before* the message
/// got applied and is only sent once the store has been updated.
pub trait Effect<S> {
    fn request(&self, state: &S) -> Option<ApiRequest>;
}

/// Dispatch chain of a store: log the message, log the store around the
/// update, send the request once the reducer ran.
pub fn store_dispatch<S, M>(store: StoreDispatch<S>) -> impl Dispatch<M> + Clone
where
    S: Store + Debug,
    M: Reducer<S> + Effect<S> + Debug + 'static,
{
    let apply = {
        let store = store.clone();
        move |msg: M| store.apply(msg)
    };

    let apply = Dispatch::<M>::wrap(apply, as_request(store.clone()));
    let apply = Dispatch::<M>::wrap(apply, log_store(Level::Trace, store));

    Dispatch::<M>::wrap(apply, log_msg(Level::Info))
}

pub struct AsRequest<S: Store>(StoreDispatch<S>);

impl<S: Store> Clone for AsRequest<S> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

pub fn as_request<S: Store>(store: StoreDispatch<S>) -> AsRequest<S> {
    AsRequest(store)
}

impl<S, M, D> Middleware<M, D> for AsRequest<S>
where
    S: Store,
    M: Effect<S>,
    D: Dispatch<M>,
{
    fn invoke(&self, msg: M, next: D) {
        let request = msg.request(&*self.0.get());

        next.invoke(msg);

        if let Some(request) = request {
            dispatch::invoke(request);
        }
    }
}

#[derive(Clone)]
pub struct LogMsg(Level);

pub fn log_msg(level: Level) -> LogMsg {
    LogMsg(level)
}

impl<M, D> Middleware<M, D> for LogMsg
where
    M: Debug,
    D: Dispatch<M>,
{
    fn invoke(&self, msg: M, next: D) {
        log!(self.0, "-> {:?}", msg);

        next.invoke(msg);
    }
}

pub struct LogStore<S: Store>(Level, StoreDispatch<S>);

impl<S: Store> Clone for LogStore<S> {
    fn clone(&self) -> Self {
        Self(self.0, self.1.clone())
    }
}

pub fn log_store<S: Store>(level: Level, store: StoreDispatch<S>) -> LogStore<S> {
    LogStore(level, store)
}

impl<S, M, D> Middleware<M, D> for LogStore<S>
where
    S: Store + Debug,
    D: Dispatch<M>,
{
    fn invoke(&self, msg: M, next: D) {
        let name = type_name::<S>();

        log!(self.0, "{} before: {:?}", name, self.1.get());

        next.invoke(msg);

        log!(self.0, "{} after: {:?}", name, self.1.get());
    }
}

/// Per message type routing, so that components and host callbacks can send
/// a message without holding on to the store it ends up in.
pub mod dispatch {
    use core::any::type_name;
    use core::cell::RefCell;

    extern crate alloc;
    use alloc::rc::Rc;

    use anymap2::AnyMap;
    use log::warn;

    use super::Middleware;

    pub trait Dispatch<M> {
        fn invoke(&self, msg: M);

        /// Puts `middleware` in front of this dispatch.
        fn wrap<L>(self, middleware: L) -> Layer<L, Self>
        where
            Self: Sized + Clone,
            L: Middleware<M, Self>,
        {
            Layer {
                middleware,
                next: self,
            }
        }
    }

    impl<M, D> Dispatch<M> for Rc<D>
    where
        D: Dispatch<M> + ?Sized,
    {
        fn invoke(&self, msg: M) {
            (**self).invoke(msg);
        }
    }

    impl<M, F> Dispatch<M> for F
    where
        F: Fn(M),
    {
        fn invoke(&self, msg: M) {
            (self)(msg);
        }
    }

    #[derive(Clone)]
    pub struct Layer<L, D> {
        middleware: L,
        next: D,
    }

    impl<M, L, D> Dispatch<M> for Layer<L, D>
    where
        L: Middleware<M, D>,
        D: Dispatch<M> + Clone,
    {
        fn invoke(&self, msg: M) {
            self.middleware.invoke(msg, self.next.clone());
        }
    }

    thread_local! {
        static ROUTES: RefCell<AnyMap> = RefCell::new(AnyMap::new());
    }

    struct Route<M>(Rc<dyn Dispatch<M>>);

    /// Routes `msg` to the dispatch registered for its type.
    ///
    /// Messages sent before the UI has registered its routes are dropped.
    pub fn invoke<M>(msg: M)
    where
        M: 'static,
    {
        match get::<M>() {
            Some(route) => route.invoke(msg),
            None => warn!("No dispatch registered for {}, dropping", type_name::<M>()),
        }
    }

    pub fn get<M>() -> Option<Rc<dyn Dispatch<M>>>
    where
        M: 'static,
    {
        ROUTES.with(|routes| routes.borrow().get::<Route<M>>().map(|route| route.0.clone()))
    }

    /// Replaces the route for `M`.
    pub fn register<M, D>(dispatch: D)
    where
        D: Dispatch<M> + 'static,
        M: 'static,
    {
        let route = Route::<M>(Rc::new(dispatch));

        ROUTES.with(|routes| {
            routes.borrow_mut().insert(route);
        });
    }

}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use yewdux::Context;

    use crate::dto::*;
    use crate::ui::relays::{RelayMsg, RelaysStore};

    use super::*;

    type Sent = Rc<RefCell<Vec<(ApiRequest, RelaysStore)>>>;

    fn relays(cx: &Context, relays: Vec<Relay>) -> StoreDispatch<RelaysStore> {
        let store = StoreDispatch::<RelaysStore>::new(cx);
        store.apply(RelayMsg::Sync(relays));

        store
    }

    /// Records every outgoing request along with the store as it was when the request left.
    fn record_requests(store: StoreDispatch<RelaysStore>) -> Sent {
        let sent = Sent::default();

        {
            let sent = sent.clone();

            dispatch::register::<ApiRequest, _>(move |request: ApiRequest| {
                sent.borrow_mut().push((request, (*store.get()).clone()));
            });
        }

        sent
    }

    #[test]
    fn click_marks_processing_before_the_request_leaves() {
        let cx = Context::new();
        let store = relays(
            &cx,
            vec![Relay {
                relay_n: Some(1),
                current_state: RelayState::Off,
                ..Default::default()
            }],
        );
        let sent = record_requests(store.clone());

        store_dispatch::<RelaysStore, RelayMsg>(store.clone())
            .invoke(RelayMsg::Click(RelayKey::new("sonoff", Some(1))));

        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(matches!(
            sent[0].0,
            ApiRequest::Command(PluginCommand::ToggleRelay(_))
        ));
        assert!(sent[0].1.processing.contains("sonoff|1"));
    }

    #[test]
    fn confirmation_holds_the_toggle_until_confirmed() {
        let cx = Context::new();
        let store = relays(
            &cx,
            vec![Relay {
                relay_n: Some(1),
                current_state: RelayState::On,
                warn: true,
                ..Default::default()
            }],
        );
        let sent = record_requests(store.clone());
        let chain = store_dispatch::<RelaysStore, RelayMsg>(store.clone());

        chain.invoke(RelayMsg::Click(RelayKey::new("sonoff", Some(1))));

        assert!(sent.borrow().is_empty());
        assert!(store.get().warning);

        chain.invoke(RelayMsg::Confirm);

        let sent = sent.borrow();
        assert_eq!(sent.len(), 1);
        assert!(!sent[0].1.warning);
        assert!(sent[0].1.processing.contains("sonoff|1"));
    }
}
