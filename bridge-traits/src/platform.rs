//! Thread-safety markers for bridge traits.
//!
//! On native targets the player's control task can hop between runtime worker
//! threads, so every bridge object must be `Send` (and usually `Sync`). On
//! `wasm32` everything lives on the page's single thread and browser handles
//! are neither, so the markers collapse to nothing there.

macro_rules! platform_marker {
    ($(#[$doc:meta])* $name:ident: $($bound:tt)+) => {
        $(#[$doc])*
        #[cfg(not(target_arch = "wasm32"))]
        pub trait $name: $($bound)+ {}

        #[cfg(not(target_arch = "wasm32"))]
        impl<T: ?Sized + $($bound)+> $name for T {}

        $(#[$doc])*
        #[cfg(target_arch = "wasm32")]
        pub trait $name {}

        #[cfg(target_arch = "wasm32")]
        impl<T: ?Sized> $name for T {}
    };
}

platform_marker!(
    /// `Send + Sync` on native targets. Required of shared bridges such as
    /// the render surface, audio focus and clock.
    PlatformSendSync: Send + Sync
);

platform_marker!(
    /// `Send` on native targets. Required of objects owned by one task, such
    /// as media engines.
    PlatformSend: Send
);
