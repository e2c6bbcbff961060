mod r2;
mod w1;

use super::Arch;

pub const ARCH_NAMES: [&str; 2] = [w1::ARCH.name, r2::ARCH.name];

pub static ARCHS: [Arch; 2] = [w1::ARCH, r2::ARCH];
