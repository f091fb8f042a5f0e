//! # 网络脚本模板
//!
//! `hx` 与 `vmd` 写入器使用的固定文本模板。
//! 大写占位符在写出时被替换。

/// ZIBAmira 网络：`FILENAME` 替换为输出文件基础名
pub const HX_NETWORK: &str = r#"# Amira Script
remove -all
remove FILENAME.am FILENAME.cmap Voltex

# Create viewers
viewer setBackgroundMode 1
viewer setBackgroundColor 0.06 0.13 0.24
viewer setBackgroundColor2 0.72 0.72 0.78
viewer setTransparencyType 5
viewer setAutoRedraw 0
viewer show
mainWindow show

set hideNewModules 0
[ load ${SCRIPTDIR}/FILENAME.am ] setLabel FILENAME.am
FILENAME.am setIconPosition 20 10
FILENAME.am fire
FILENAME.am setViewerMask 16383

set hideNewModules 0
[ load ${SCRIPTDIR}/FILENAME.cmap ] setLabel FILENAME.cmap
FILENAME.cmap setIconPosition 20 40
FILENAME.cmap setViewerMask 16383
FILENAME.cmap fire

set hideNewModules 0
create HxVoltex {Voltex}
Voltex setIconPosition 180 10
Voltex data connect FILENAME.am
Voltex colormap setDefaultColor 1 0.8 0.5
Voltex colormap setDefaultAlpha 0.5
Voltex colormap connect FILENAME.cmap
Voltex fire
Voltex options setValue 0 1
Voltex textures setValue 0
Voltex lookup setValue 1
Voltex alphaScale setValue 1
Voltex slices setValue 256
Voltex fire
Voltex setViewerMask 16383

set hideNewModules 0

viewer 0 setCameraOrientation 1 0 0 0
viewer 0 setCameraPosition 0 0 50
viewer 0 setCameraFocalDistance 50
viewer 0 setCameraType orthographic
viewer 0 setAutoRedraw 1
viewer 0 redraw
"#;

/// VMD 网络外壳：`MOLECULES` 替换为所有分子块
pub const VMD_NETWORK: &str = r#"#!/usr/local/bin/vmd
# VMD network created by voxport

display projection   Orthographic
display depthcue     off
display nearclip set 0.010000
color Display Background white
axes location Off
light 0 on
light 1 on
light 2 off
light 3 off

MOLECULES
"#;

/// VMD 分子块：每个 cube 文件一块
///
/// 占位符：`INDEX` 分子序号，`CUBEFILE` cube 文件路径，`TITLE` 分子名，
/// `ISORED`/`ISOBLUE` 等值面值，`RENDER` 渲染行前缀（空或 `#`）
pub const VMD_MOLECULE: &str = r#"# Molecule INDEX: TITLE
mol new {CUBEFILE} type cube first 0 last -1 step 1 filebonds 1 autobonds 1 waitfor all
mol rename top {TITLE}
mol delrep 0 top
mol representation CPK 1.000000 0.300000 10.000000 10.000000
mol color Name
mol selection {all}
mol material Opaque
mol addrep top
mol representation Isosurface ISORED 0 0 0 1 1
mol color ColorID 1
mol material Transparent
mol addrep top
mol representation Isosurface ISOBLUE 0 0 0 1 1
mol color ColorID 0
mol material Transparent
mol addrep top
RENDERrender TachyonInternal TITLE.tga
RENDERmol delete top
"#;
