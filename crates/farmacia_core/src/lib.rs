pub mod domain;
pub mod ports;
pub mod report;

pub use domain::{
    CambiosRol, Card, Credenciales, Dashboard, DetalleReporte, Estado, Medicina, MedicinaCostosa,
    NuevaMedicina, NuevoRol, Posicion, ReporteInventario, ResumenInventario, Rol, RolRef, Tamano,
    Usuario, TIPO_INVENTARIO,
};
pub use ports::{
    DashboardStore, FotoStore, InventarioStore, PortError, PortResult, ReporteStore, RolStore,
    UsuarioStore,
};
pub use report::{derivar_estado, derivar_precio_por_unidad, resumir_inventario};
