/// Constructs a type fact.
#[macro_export]
macro_rules! typefact {
    (_) => {
        $crate::analyser::types::TypeFact::default()
    };
    ($arg:expr) => {{
        let fact: $crate::analyser::types::TypeFact =
            $crate::analyser::types::GenericFact::Only($arg);
        fact
    }};
}

/// Constructs a shape fact.
#[macro_export]
macro_rules! shapefactoid {
    () =>
        ($crate::analyser::types::ShapeFactoid::closed($crate::tvec![]));
    (..) =>
        ($crate::analyser::types::ShapeFactoid::open($crate::tvec![]));
    ($($arg:tt),+; ..) =>
        ($crate::analyser::types::ShapeFactoid::open($crate::tvec![$($crate::dimfact!($arg)),+]));
    ($($arg:tt),+) =>
        ($crate::analyser::types::ShapeFactoid::closed($crate::tvec![$($crate::dimfact!($arg)),+]));
}

/// Constructs a dimension fact.
#[macro_export]
macro_rules! dimfact {
    (_) => {
        $crate::analyser::types::DimFact::default()
    };
    ($arg:expr) => {
        $crate::analyser::types::GenericFact::Only($arg)
    };
}

/// Constructs a value fact.
#[macro_export]
macro_rules! valuefact {
    (_) => {
        $crate::analyser::types::ValueFact::default()
    };
    ($arg:expr) => {{
        let fact: $crate::analyser::types::ValueFact =
            $crate::analyser::types::GenericFact::Only(std::sync::Arc::new($arg));
        fact
    }};
}
