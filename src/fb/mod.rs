//! Linear framebuffer surface
//!
//! Opens a framebuffer device (normally /dev/fb0), queries its geometry
//! via the FBIOGET ioctls, and memory-maps the pixel region. Pixels are
//! assumed to be 32-bit little-endian XRGB; the high byte is written zero.

use std::fs::{File, OpenOptions};
use std::num::NonZeroUsize;
use std::os::fd::AsRawFd;
use std::ptr::NonNull;

use anyhow::{Context, Result};
use log::info;
use nix::sys::mman::{mmap, munmap, MapFlags, ProtFlags};

const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;
const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;

/// Color channel layout descriptor (linux/fb.h fb_bitfield)
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)]
struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

/// Variable screen information (linux/fb.h fb_var_screeninfo)
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)]
struct FbVarScreeninfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

/// Fixed screen information (linux/fb.h fb_fix_screeninfo)
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
#[allow(dead_code)]
struct FbFixScreeninfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    fb_type: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

nix::ioctl_read_bad!(fbioget_vscreeninfo, FBIOGET_VSCREENINFO, FbVarScreeninfo);
nix::ioctl_read_bad!(fbioget_fscreeninfo, FBIOGET_FSCREENINFO, FbFixScreeninfo);

/// Memory-mapped framebuffer.
///
/// All drawing goes through bounds-checked [`Framebuffer::put_pixel`];
/// after a successful open the surface cannot fail.
pub struct Framebuffer {
    // Held for the lifetime of the mapping
    _file: File,
    mem: NonNull<libc::c_void>,
    mem_size: usize,
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
    line_length: usize,
}

impl Framebuffer {
    /// Open and map the framebuffer device. Any failure here is fatal for
    /// the caller; there is no screen to fall back to.
    pub fn open(path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("Failed to open framebuffer device {}", path))?;

        let mut vinfo = FbVarScreeninfo::default();
        unsafe { fbioget_vscreeninfo(file.as_raw_fd(), &mut vinfo) }
            .context("FBIOGET_VSCREENINFO failed")?;

        let mut finfo = FbFixScreeninfo::default();
        unsafe { fbioget_fscreeninfo(file.as_raw_fd(), &mut finfo) }
            .context("FBIOGET_FSCREENINFO failed")?;

        let mem_size = finfo.smem_len as usize;
        let len = NonZeroUsize::new(mem_size).context("Framebuffer reports zero memory size")?;
        let mem = unsafe {
            mmap(
                None,
                len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &file,
                0,
            )
        }
        .context("Failed to mmap framebuffer")?;

        info!(
            "Framebuffer: {}x{} {}bpp, stride {} bytes",
            vinfo.xres, vinfo.yres, vinfo.bits_per_pixel, finfo.line_length
        );

        Ok(Self {
            _file: file,
            mem,
            mem_size,
            width: vinfo.xres as usize,
            height: vinfo.yres as usize,
            bytes_per_pixel: (vinfo.bits_per_pixel / 8) as usize,
            line_length: finfo.line_length as usize,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Write one pixel. Out-of-bounds coordinates are silently ignored.
    #[inline]
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let offset = y as usize * self.line_length + x as usize * self.bytes_per_pixel;
        if offset + 4 > self.mem_size {
            return;
        }
        unsafe {
            let p = self.mem.as_ptr().cast::<u8>().add(offset).cast::<u32>();
            p.write_unaligned(color);
        }
    }

    /// Fill a rectangle, clipped to the visible window
    pub fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, color: u32) {
        for row in 0..h as i32 {
            for col in 0..w as i32 {
                self.put_pixel(x + col, y + row, color);
            }
        }
    }

    /// Fill the whole visible window
    pub fn clear(&mut self, color: u32) {
        self.fill_rect(0, 0, self.width, self.height, color);
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            let _ = munmap(self.mem, self.mem_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The ioctl argument structs must match the kernel ABI exactly;
    // a silent layout drift would corrupt the stack on the ioctl call.
    #[test]
    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    fn test_screeninfo_layouts_match_kernel_abi() {
        assert_eq!(std::mem::size_of::<FbBitfield>(), 12);
        assert_eq!(std::mem::size_of::<FbVarScreeninfo>(), 160);
        assert_eq!(std::mem::size_of::<FbFixScreeninfo>(), 80);
    }
}
