mod util;

pub mod cpp20;
pub mod cpp23;
pub mod cpp26;
pub mod performance;

// baseline-performance checks
pub use performance::{
    AvoidCoutCerr, AvoidDynamicCast, AvoidStdAny, AvoidStdBind, AvoidStdEndl, AvoidStdFunction,
    AvoidStdRegex, AvoidVirtualInLoop, PreferEmplace, PreferFromChars, PreferNoexceptMove,
    PreferReserve, PreferStringView, PreferUniquePtr, PreferVector,
};

// standard-upgrade checks
pub use cpp20::{
    PreferContains, PreferEraseIf, PreferFlatContainers, PreferFormat, PreferJthread, PreferSpan,
    PreferStartsEndsWith,
};
pub use cpp23::{
    PreferExpected, PreferMoveOnlyFunction, PreferPrint, PreferToUnderlying, PreferUnreachable,
};
pub use cpp26::{PreferCopyableFunction, PreferFunctionRef, PreferHive, PreferInplaceVector};
