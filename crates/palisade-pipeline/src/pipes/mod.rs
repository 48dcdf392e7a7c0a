//! Built-in pipes.
//!
//! | Pipe                 | Input                         | Output                 |
//! |----------------------|-------------------------------|------------------------|
//! | [`ParseIntPipe`]     | `"-42"`, `42`                 | integer                |
//! | [`ParseFloatPipe`]   | `"3.14"`, `3.14`              | float                  |
//! | [`ParseBoolPipe`]    | `"true"`, `"1"`, `"false"`, `"0"` | boolean            |
//! | [`ParseUuidPipe`]    | hyphenated UUID string        | the same string        |
//! | [`ParseArrayPipe`]   | `"a,b,c"` or repeated query   | array of strings       |
//! | [`DefaultValuePipe`] | absent value                  | the configured default |
//! | [`ToLowerCasePipe`]  | string                        | lower-cased string     |
//! | [`TrimPipe`]         | string                        | trimmed string         |
//! | [`ValidationPipe`]   | any                           | unchanged, or rejected |

pub mod array;
pub mod default;
pub mod parse;
pub mod string;
pub mod validation;

pub use array::ParseArrayPipe;
pub use default::DefaultValuePipe;
pub use parse::{ParseBoolPipe, ParseFloatPipe, ParseIntPipe, ParseUuidPipe};
pub use string::{ToLowerCasePipe, TrimPipe};
pub use validation::ValidationPipe;
