//! Whole-document tests across parser and serializer.

mod round_trip;
