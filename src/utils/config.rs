//! Configuration and constants for the analyzer.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Event categories that mark device-kernel execution records.
// Both CUDA (Kernel) and HIP (KernelExecution, FillBuffer) captures appear.
pub const KERNEL_CATEGORIES: &[&str] = &["Kernel", "KernelExecution", "FillBuffer"];

// CPU-side async launch call names. These wrap the real kernel with a
// fixed-overhead indirection and get substituted away in variation output.
pub const LAUNCH_CALL_NAMES: &[&str] = &[
    "hipExtModuleLaunchKernel",
    "hipLaunchKernel",
    "cudaLaunchKernel",
];

// Iteration boundary marker prefixes (different capture sources use
// different names for the same thing)
pub const ITERATION_MARKER_PREFIXES: &[&str] = &["iteration", "ProfilerStep#"];

/// Grace period past the iteration end boundary for device-kernel events.
/// Kernels are sometimes launched inside the iteration but complete after
/// the boundary marker; one second in microsecond traces.
pub const KERNEL_GRACE_PERIOD: i64 = 1_000_000;

/// Records carrying this marker in their `desc` argument are capture-side
/// hints that duplicate real events and would count twice.
pub const HINT_MARKER: &str = "UserMarker";

/// Substring identifying elementwise device kernels
pub const ELEMENTWISE_KERNEL_PATTERN: &str = "elementwise_kernel";

// Device BLAS kernel prefixes for the "math" time bucket
// (rocBLAS Cijk_* assembly kernels, cuBLAS gemm/gemv)
pub const MATH_KERNEL_PATTERNS: &[&str] = &["Cijk_", "gemm", "gemv"];

// Argument keys under which capture formats carry structured operand shapes
pub const SHAPE_ATTR_KEYS: &[&str] = &["sizes", "Input Dims", "Input dims"];

/// Key under which a shape parsed out of an operation name is cached back
/// onto the operation's arguments
pub const CACHED_SHAPE_KEY: &str = "sizes";

/// Key under which bandwidth estimates are attached to kernel arguments
pub const BANDWIDTH_KEY: &str = "BW";

/// Synthetic root node name (excluded from all summaries)
pub const ROOT_NODE_NAME: &str = "top_node";
