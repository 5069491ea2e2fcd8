pub mod arguments;
pub mod classpath;
pub mod context;
pub mod process;
pub mod registry;
pub mod template;

pub use arguments::{
    assemble, build_game_args, build_jvm_args, build_launch_command, build_substitution_map,
    LaunchCommand, GRAPHICS_OVERRIDE_VAR,
};
pub use classpath::{build_classpath, get_classpath_separator};
pub use context::{LaunchContext, LaunchProfile, DEFAULT_RESOLUTION};
pub use process::{GameProcess, ProcessExit};
pub use registry::ProcessRegistry;
pub use template::SubstitutionMap;
