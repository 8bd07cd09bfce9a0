// Route module for /.
