mod b1;
mod b2;
mod f;
mod r1;
mod w2;

use super::Arch;

pub static ARCHS: [Arch; 5] = [b1::ARCH, w2::ARCH, b2::ARCH, r1::ARCH, f::ARCH];
