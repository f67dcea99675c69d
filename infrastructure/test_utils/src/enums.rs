// Copyright 2026, The Moblink Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

/// Bind the fields of an expected enum variant, panicking if a different variant was given.
///
/// ```edition2021
/// # use moblink_test_utils::unpack_enum;
/// #[derive(Debug)]
/// enum Sample<'a> {
///     Pair(u8, &'a str),
///     Record { count: u8 },
///     Unit,
/// }
///
/// let v = Sample::Pair(7, "seven");
/// unpack_enum!(Sample::Pair(count, name) = v);
/// assert_eq!(count, 7);
/// assert_eq!(name, "seven");
///
/// let v = Sample::Record { count: 7 };
/// unpack_enum!(Sample::Record { count } = v);
/// assert_eq!(count, 7);
///
/// let v = Sample::Unit;
/// unpack_enum!(Sample::Unit = v);
/// ```
#[macro_export]
macro_rules! unpack_enum {
    ($($variant:ident)::+ { $($field:tt),* } = $value:expr) => {
        let ($($field),+) = match $value {
            $($variant)::+ { $($field),+ } => ($($field),+),
            other => panic!("Unexpected enum variant: {:?}", other),
        };
    };
    ($($variant:ident)::+ ( $($field:tt),* ) = $value:expr) => {
        let ($($field),+) = match $value {
            $($variant)::+($($field),+) => ($($field),+),
            other => panic!("Unexpected enum variant: {:?}", other),
        };
    };
    ($($variant:ident)::+ = $value:expr) => {
        match $value {
            $($variant)::+ => {},
            other => panic!("Unexpected enum variant: {:?}", other),
        };
    };
}

#[cfg(test)]
mod test {
    #[derive(Debug)]
    enum TestEnum {
        Tuple(u32),
        Unit,
    }

    #[test]
    fn unpacks_tuple_variant() {
        let v = TestEnum::Tuple(42);
        unpack_enum!(TestEnum::Tuple(n) = v);
        assert_eq!(n, 42);
    }

    #[test]
    #[should_panic(expected = "Unexpected enum variant")]
    fn panics_on_wrong_variant() {
        let v = TestEnum::Unit;
        unpack_enum!(TestEnum::Tuple(_n) = v);
    }
}
