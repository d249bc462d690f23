//! Enumerated configuration for clipping, offsetting, and kernel selection.
//!
//! The discriminants of the geometry enums are the codes the kernel call
//! surface expects; keep them stable.

use std::str::FromStr;

use polyclip_kernel::abi;

use crate::errors::ClipperError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ClipType {
    Intersection = 0,
    Union = 1,
    Difference = 2,
    Xor = 3,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum PolyFillType {
    EvenOdd = 0,
    NonZero = 1,
    Positive = 2,
    Negative = 3,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum JoinType {
    Square = 0,
    Round = 1,
    Miter = 2,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum EndType {
    ClosedPolygon = 0,
    ClosedLine = 1,
    OpenButt = 2,
    OpenSquare = 3,
    OpenRound = 4,
}

impl EndType {
    pub fn is_open_end(self) -> bool {
        matches!(self, Self::OpenButt | Self::OpenSquare | Self::OpenRound)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PointInPolygonResult {
    Outside,
    OnBoundary,
    Inside,
}

/// One concrete delivery format of the native kernel.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NativeLibFormat {
    Wasm,
    AsmJs,
}

impl NativeLibFormat {
    pub fn artifact(self) -> &'static str {
        match self {
            Self::Wasm => abi::ARTIFACT_WASM,
            Self::AsmJs => abi::ARTIFACT_ASMJS,
        }
    }
}

/// Which format(s) acquisition may try, and in what order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RequestedFormat {
    WasmWithAsmJsFallback,
    WasmOnly,
    AsmJsOnly,
}

impl RequestedFormat {
    /// Formats to attempt, in order.
    pub fn candidates(self) -> &'static [NativeLibFormat] {
        match self {
            Self::WasmWithAsmJsFallback => &[NativeLibFormat::Wasm, NativeLibFormat::AsmJs],
            Self::WasmOnly => &[NativeLibFormat::Wasm],
            Self::AsmJsOnly => &[NativeLibFormat::AsmJs],
        }
    }
}

impl FromStr for RequestedFormat {
    type Err = ClipperError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "wasmWithAsmJsFallback" => Ok(Self::WasmWithAsmJsFallback),
            "wasmOnly" => Ok(Self::WasmOnly),
            "asmJsOnly" => Ok(Self::AsmJsOnly),
            other => Err(ClipperError::UnknownFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_format_parses_known_names() {
        assert_eq!(
            "wasmOnly".parse::<RequestedFormat>().unwrap(),
            RequestedFormat::WasmOnly
        );
        assert_eq!(
            "wasmWithAsmJsFallback".parse::<RequestedFormat>().unwrap(),
            RequestedFormat::WasmWithAsmJsFallback
        );
    }

    #[test]
    fn requested_format_rejects_unknown_names() {
        let err = "native".parse::<RequestedFormat>().unwrap_err();
        assert!(matches!(err, ClipperError::UnknownFormat(name) if name == "native"));
    }

    #[test]
    fn fallback_tries_wasm_first() {
        assert_eq!(
            RequestedFormat::WasmWithAsmJsFallback.candidates(),
            [NativeLibFormat::Wasm, NativeLibFormat::AsmJs]
        );
    }
}
