// src/pipeline/shim.rs

//! Runtime shims prepended to spec files so the test framework's globals
//! are available without an explicit import.

use crate::types::SpecFlavor;

const JASMINE_SHIM: &str = "var __jasmine = require('/lib/jasmine');\
var methods = ['spyOn','it','xit','expect','runs','waits','waitsFor','beforeEach','afterEach','describe','xdescribe','jasmine'];\
methods.forEach(function(method) {this[method] = __jasmine[method];});";

const MOCHA_SHOULD_SHIM: &str = "require('/lib/should');\n";

const MOCHA_CHAI_SHIM: &str =
    "var chai = require('/lib/chai'); var expect = chai.expect; var assert = chai.assert;\n";

impl SpecFlavor {
    /// Exact text injected in front of a transformed spec file.
    pub fn shim(self) -> &'static str {
        match self {
            SpecFlavor::Jasmine => JASMINE_SHIM,
            SpecFlavor::MochaShould => MOCHA_SHOULD_SHIM,
            SpecFlavor::MochaChai => MOCHA_CHAI_SHIM,
        }
    }
}

/// Prepend the flavor's shim to transformed spec source.
pub fn wrap_spec(flavor: SpecFlavor, transformed: &str) -> String {
    let shim = flavor.shim();
    let mut out = String::with_capacity(shim.len() + transformed.len());
    out.push_str(shim);
    out.push_str(transformed);
    out
}
